//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changed--> DispatchActor --Css/Js/Reload/Error--> WsActor
//!                         ^      |
//!                         +------+ Finished (from spawn_blocking stage runs)
//! ```

use std::path::PathBuf;

use crate::stage::{StageId, StageReport};
use crate::watch::ReloadAction;

// =============================================================================
// DispatchActor Messages
// =============================================================================

/// Messages to Dispatch Actor
#[derive(Debug)]
pub enum DispatchMsg {
    /// Debounced batch of changed paths, relative to the project root
    Changed(Vec<PathBuf>),
    /// A stage run completed
    Finished {
        stage: StageId,
        reload: ReloadAction,
        outcome: StageOutcome,
    },
    /// Shutdown
    Shutdown,
}

/// Result of a stage run as seen by the dispatcher.
#[derive(Debug)]
pub enum StageOutcome {
    Done(StageReport),
    Failed {
        /// Source path (or stage name) shown in the browser overlay
        path: String,
        error: String,
    },
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Stylesheet rewritten; clients swap it in place
    Css(String),
    /// Script rewritten
    Js(String),
    /// Reload page on every client
    Reload { reason: String },
    /// Stage failure (display overlay, no reload)
    Error { path: String, error: String },
    /// Clear error overlay (stage succeeded after error)
    ClearError,
    /// Add client
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
