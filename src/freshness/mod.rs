//! Change detection: mtime first, blake3 content hash as tie-breaker.
//!
//! A destination is stale when it is missing or older than its source. A
//! destination that is older but byte-identical is left alone, so touching a
//! source without editing it does not trigger a rewrite.

mod hash;
pub mod mtime;

pub use hash::compute_file_hash;
pub use mtime::is_newer_than;

use std::path::Path;

/// Check whether `dest` must be (re)written from `source`.
pub fn needs_update(source: &Path, dest: &Path) -> bool {
    if !dest.exists() {
        return true;
    }
    if !is_newer_than(source, dest) {
        return false;
    }
    compute_file_hash(source) != compute_file_hash(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_dest_needs_update() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        assert!(needs_update(&src, &dir.path().join("missing.txt")));
    }

    #[test]
    fn test_fresh_dest_skipped() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&src, "a").unwrap();
        thread::sleep(Duration::from_millis(20));
        fs::write(&dest, "something else").unwrap();
        assert!(!needs_update(&src, &dest));
    }

    #[test]
    fn test_touched_but_identical_skipped() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&dest, "same").unwrap();
        thread::sleep(Duration::from_millis(20));
        fs::write(&src, "same").unwrap();
        assert!(is_newer_than(&src, &dest));
        assert!(!needs_update(&src, &dest));
    }

    #[test]
    fn test_newer_and_different_needs_update() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&dest, "old").unwrap();
        thread::sleep(Duration::from_millis(20));
        fs::write(&src, "new").unwrap();
        assert!(needs_update(&src, &dest));
    }
}
