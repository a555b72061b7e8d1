//! Configuration section definitions.
//!
//! | Module   | TOML Section | Purpose                              |
//! |----------|--------------|--------------------------------------|
//! | `serve`  | `[serve]`    | Dev server and live-reload ports     |
//! | `styles` | `[styles]`   | Style preprocessor and browser list  |

mod serve;
mod styles;

pub use serve::ServeConfig;
pub use styles::{Preprocessor, StylesConfig};
