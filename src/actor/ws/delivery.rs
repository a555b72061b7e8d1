use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::HotReloadMessage;

impl WsActor {
    /// Broadcast a message to all connected clients, dropping dead ones.
    pub(super) fn broadcast(&self, msg: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        let frame = Message::Text(msg.to_json().into());
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", count);
    }
}
