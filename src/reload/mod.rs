//! Live reload: wire protocol, WebSocket acceptor and the push handle.
//!
//! ```text
//! DispatchActor --ReloadHandle--> WsActor --HotReloadMessage--> browsers
//!                                    ^
//! acceptor thread --AddClient--------+
//! ```

mod handle;
pub mod message;
pub mod server;

pub use handle::ReloadHandle;
pub use message::HotReloadMessage;
