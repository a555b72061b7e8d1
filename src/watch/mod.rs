//! File-watch rules.

mod table;

pub use table::{ReloadAction, WatchTable};
