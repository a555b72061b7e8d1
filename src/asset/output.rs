//! Output writing with parent directory creation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Write `bytes` to `path`, creating parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Copy `source` to `dest`, creating parent directories.
pub fn copy_output(source: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;
    fs::copy(source, dest)
        .map(|_| ())
        .with_context(|| format!("failed to copy {} -> {}", source.display(), dest.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
