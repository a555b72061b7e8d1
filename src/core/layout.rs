//! Fixed project layout.
//!
//! ```text
//! <root>
//! ├── src/             source tree (read-only input)
//! │   ├── fonts/
//! │   ├── img/
//! │   ├── js/
//! │   ├── scss/
//! │   └── *.html
//! ├── tmp/             staging tree (served in dev)
//! │   ├── css/  img/  js/  ...
//! └── dist/            distribution tree
//!     ├── css/  fonts/  img/  js/
//!     └── *.html
//! ```
//!
//! The layout is part of the CLI contract and intentionally not configurable.

use std::path::{Path, PathBuf};

pub const SOURCE_DIR: &str = "src";
pub const STAGING_DIR: &str = "tmp";
pub const DIST_DIR: &str = "dist";

/// Image extensions handled by the image stages.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "gif", "svg"];

/// A glob over the source tree, relative to the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSet {
    pub pattern: &'static str,
    /// Restrict matches to these extensions (`None` = any file).
    pub extensions: Option<&'static [&'static str]>,
    /// Skip files whose name starts with `_` (Sass partials).
    pub skip_partials: bool,
}

impl SourceSet {
    const fn any(pattern: &'static str) -> Self {
        Self {
            pattern,
            extensions: None,
            skip_partials: false,
        }
    }

    /// Everything under the source tree.
    pub const ALL: Self = Self::any("src/**/*");
    /// Top-level stylesheet entries.
    pub const STYLES: Self = Self {
        pattern: "src/scss/*.scss",
        extensions: None,
        skip_partials: true,
    };
    /// The single dev script entry.
    pub const SCRIPT_ENTRY: Self = Self::any("src/js/main.js");
    /// Every script source, for the production bundle.
    pub const SCRIPTS: Self = Self::any("src/js/**/*.js");
    pub const IMAGES: Self = Self {
        pattern: "src/img/**/*",
        extensions: Some(IMAGE_EXTENSIONS),
        skip_partials: false,
    };
    pub const FONTS: Self = Self::any("src/fonts/**/*");
    pub const MARKUP: Self = Self::any("src/*.html");
}

/// Resolved project paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    pub fn staging(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn dist(&self) -> PathBuf {
        self.root.join(DIST_DIR)
    }

    /// Path relative to the project root, or the path itself when outside it.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
