//! Source discovery and output writing.

mod output;
mod scan;

pub use output::{copy_output, write_output};
pub use scan::{SourceFile, discover, matches};
