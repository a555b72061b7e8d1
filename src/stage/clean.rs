//! `clean` / `clean:build`: empty a tree, keep the directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{StageId, StageReport};

pub(super) fn run_clean(stage: StageId, dir: &Path) -> Result<StageReport> {
    let removed = clean_dir(dir)?;
    crate::debug!(stage.name(); "removed {} entries from {}", removed, dir.display());
    Ok(StageReport::new(stage))
}

/// Delete every entry inside `dir`. A missing directory is already clean.
///
/// Returns the number of top-level entries removed.
pub fn clean_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .with_context(|| format!("failed to stat {}", path.display()))?;

        if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("failed to remove {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_directory() {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(dist.join("css")).unwrap();
        fs::write(dist.join("css/style.css"), "a").unwrap();
        fs::write(dist.join("index.html"), "b").unwrap();

        assert_eq!(clean_dir(&dist).unwrap(), 2);
        assert!(dist.is_dir());
        assert_eq!(fs::read_dir(&dist).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_missing_dir_ok() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_dir(&dir.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn test_clean_empty_dir_ok() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_dir(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_clean_not_a_directory_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tmp");
        fs::write(&file, "x").unwrap();
        assert!(clean_dir(&file).is_err());
    }
}
