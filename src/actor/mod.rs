//! Actor System for Watch Mode
//!
//! Message-passing concurrency for the default `serve + watch` invocation:
//!
//! ```text
//! FsActor --> DispatchActor --> WsActor
//! (watch)     (stage runs)     (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `dispatch` - Watch table lookup, stage scheduling, reload pushes
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod dispatch;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
