use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::HotReloadMessage;

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Handshake a new connection and register it.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking afterwards for polling reads
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let connected = HotReloadMessage::connected();
        if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
            crate::log!("reload"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(ref error) = self.pending_error
            && let Err(e) = ws.send(Message::Text(error.to_json().into()))
        {
            crate::debug!("reload"; "failed to send pending error: {}", e);
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "client connected (total: {})", clients.len());
    }
}

/// Drain client frames so pings are answered and closed sockets are dropped.
///
/// Clients never send anything the server acts on.
pub(super) fn client_reader_loop(clients: Clients) {
    loop {
        std::thread::sleep(READ_POLL);
        if crate::core::is_shutdown() {
            break;
        }

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(e) => {
                crate::debug!("reload"; "client dropped: {}", e);
                false
            }
        });
    }
}
