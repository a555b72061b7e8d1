//! Content hashing using blake3.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash of a missing or unreadable file.
    #[inline]
    pub const fn empty() -> Self {
        Self([0; 32])
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Hash an in-memory buffer.
    #[cfg(test)]
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

/// Compute blake3 hash of file contents.
///
/// Unreadable files hash to [`ContentHash::empty`], which never equals the
/// hash of real content.
pub fn compute_file_hash(path: &Path) -> ContentHash {
    hash_reader(path).unwrap_or_else(|_| ContentHash::empty())
}

fn hash_reader(path: &Path) -> io::Result<ContentHash> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 16 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash(*hasher.finalize().as_bytes()))
}
