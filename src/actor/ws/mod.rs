//! WebSocket Actor - Live Reload Broadcast
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting reload messages to all connected clients
//! - Replaying the current error overlay to late joiners
//!
//! # Architecture
//!
//! ```text
//! DispatchActor --[Css/Js/Reload/Error]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Clients,
    /// Error overlay shown to clients that connect while a stage is failing
    pending_error: Option<HotReloadMessage>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Css(path) => {
                    crate::debug!("reload"; "inject {}", path);
                    self.broadcast(&HotReloadMessage::css(path));
                }
                WsMsg::Js(path) => {
                    crate::debug!("reload"; "script {}", path);
                    self.broadcast(&HotReloadMessage::js(path));
                }
                WsMsg::Reload { reason } => {
                    crate::debug!("reload"; "full reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload(reason));
                }
                WsMsg::Error { path, error } => {
                    let msg = HotReloadMessage::error(path, error);
                    self.broadcast(&msg);
                    self.pending_error = Some(msg);
                }
                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("reload"; "shutting down");
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }
}
