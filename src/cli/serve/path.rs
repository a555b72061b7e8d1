//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything that would escape
/// the root, through `..` or a symlink, resolves to nothing.
pub(super) fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// URL without query string or fragment.
pub(super) fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Decode, strip query string, trim slashes. `None` for invalid UTF-8.
fn normalize_url(url: &str) -> Option<String> {
    let decoded = percent_decode_str(strip_query(url)).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tmp/css")).unwrap();
        fs::create_dir_all(dir.path().join("tmp/docs")).unwrap();
        fs::write(dir.path().join("tmp/index.html"), "home").unwrap();
        fs::write(dir.path().join("tmp/docs/index.html"), "docs").unwrap();
        fs::write(dir.path().join("tmp/css/style.css"), ".a{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "nope").unwrap();
        dir
    }

    fn resolved(dir: &TempDir, url: &str) -> Option<String> {
        let root = dir.path().join("tmp");
        resolve_path(url, &root).map(|p| fs::read_to_string(p).unwrap())
    }

    #[test]
    fn test_resolve_file_and_index() {
        let dir = site();
        assert_eq!(resolved(&dir, "/").as_deref(), Some("home"));
        assert_eq!(resolved(&dir, "/docs/").as_deref(), Some("docs"));
        assert_eq!(resolved(&dir, "/docs").as_deref(), Some("docs"));
        assert_eq!(resolved(&dir, "/css/style.css?t=123").as_deref(), Some(".a{}"));
        assert_eq!(resolved(&dir, "/missing.html"), None);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site();
        assert_eq!(resolved(&dir, "/../secret.txt"), None);
        assert_eq!(resolved(&dir, "/%2e%2e/secret.txt"), None);
        assert_eq!(resolved(&dir, "/css/..%2f..%2fsecret.txt"), None);
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/a.css?t=1"), "/a.css");
        assert_eq!(strip_query("/page#top"), "/page");
        assert_eq!(strip_query("/plain"), "/plain");
    }
}
