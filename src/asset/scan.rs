//! Source discovery.
//!
//! Expands a [`SourceSet`] glob against the project root. Each match keeps
//! its path relative to the glob base, the leading directories of the
//! pattern that contain no wildcard:
//!
//! ```text
//! src/**/*          base src/       src/img/a.png  -> img/a.png
//! src/scss/*.scss   base src/scss/  src/scss/main.scss -> main.scss
//! src/js/main.js    base src/js/    src/js/main.js -> main.js
//! ```
//!
//! A pattern whose base directory does not exist matches nothing; that is
//! not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

use crate::core::SourceSet;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the glob base; mirrors into the destination.
    pub relative: PathBuf,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Discover all files matching `set` under `root`, sorted by path.
pub fn discover(root: &Path, set: &SourceSet) -> Result<Vec<SourceFile>> {
    let base = root.join(glob_base(set.pattern));
    let full = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        set.pattern
    );

    let entries = glob::glob_with(&full, MATCH_OPTIONS)
        .with_context(|| format!("invalid source pattern `{}`", set.pattern))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to read match of `{}`", set.pattern))?;
        if !path.is_file() || !accepts(set, &path) {
            continue;
        }
        let relative = path
            .strip_prefix(&base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
        files.push(SourceFile { path, relative });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Check a single relative path against a pattern, as the watch table does.
pub fn matches(pattern: &Pattern, relative: &Path) -> bool {
    pattern.matches_path_with(relative, MATCH_OPTIONS)
}

/// Directory part of a pattern before the first wildcard component.
///
/// A literal pattern (no wildcard at all) has its parent directory as base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let wildcard = components.iter().position(|c| has_wildcard(c));

    let take = match wildcard {
        Some(index) => index,
        None => components.len().saturating_sub(1),
    };
    components[..take].iter().collect()
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

fn accepts(set: &SourceSet, path: &Path) -> bool {
    if set.skip_partials
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'))
    {
        return false;
    }
    match set.extensions {
        Some(exts) => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| exts.contains(&e)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn relatives(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/**/*"), PathBuf::from("src"));
        assert_eq!(glob_base("src/scss/*.scss"), PathBuf::from("src/scss"));
        assert_eq!(glob_base("src/js/main.js"), PathBuf::from("src/js"));
        assert_eq!(glob_base("src/*.html"), PathBuf::from("src"));
    }

    #[test]
    fn test_discover_all_recursive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/index.html");
        touch(dir.path(), "src/img/icons/a.png");
        touch(dir.path(), "src/js/main.js");

        let files = discover(dir.path(), &SourceSet::ALL).unwrap();
        assert_eq!(
            relatives(&files),
            vec!["img/icons/a.png", "index.html", "js/main.js"]
        );
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = discover(dir.path(), &SourceSet::SCRIPTS).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_literal_entry() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/js/main.js");
        touch(dir.path(), "src/js/other.js");

        let files = discover(dir.path(), &SourceSet::SCRIPT_ENTRY).unwrap();
        assert_eq!(relatives(&files), vec!["main.js"]);
    }

    #[test]
    fn test_discover_markup_top_level_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/index.html");
        touch(dir.path(), "src/partials/nav.html");

        let files = discover(dir.path(), &SourceSet::MARKUP).unwrap();
        assert_eq!(relatives(&files), vec!["index.html"]);
    }

    #[test]
    fn test_discover_skips_partials() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/scss/main.scss");
        touch(dir.path(), "src/scss/_vars.scss");

        let files = discover(dir.path(), &SourceSet::STYLES).unwrap();
        assert_eq!(relatives(&files), vec!["main.scss"]);
    }

    #[test]
    fn test_discover_image_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/img/a.png");
        touch(dir.path(), "src/img/b.svg");
        touch(dir.path(), "src/img/c.webp");
        touch(dir.path(), "src/img/notes.txt");

        let files = discover(dir.path(), &SourceSet::IMAGES).unwrap();
        assert_eq!(relatives(&files), vec!["a.png", "b.svg"]);
    }

    #[test]
    fn test_matches_relative() {
        let pattern = Pattern::new("src/scss/**/*.scss").unwrap();
        assert!(matches(&pattern, Path::new("src/scss/main.scss")));
        assert!(matches(&pattern, Path::new("src/scss/parts/_nav.scss")));
        assert!(!matches(&pattern, Path::new("src/js/main.js")));

        let markup = Pattern::new("src/*.html").unwrap();
        assert!(matches(&markup, Path::new("src/index.html")));
        assert!(!matches(&markup, Path::new("src/sub/page.html")));
    }
}
