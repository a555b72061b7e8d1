//! Core types shared across the codebase.

mod layout;
mod state;

pub use layout::{Layout, SourceSet};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
