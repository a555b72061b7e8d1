//! `[styles]` section configuration.
//!
//! ```toml
//! [styles]
//! preprocessor = "sass"              # "sass" (external) or "css" (built in)
//! sass_command = ["sass"]            # e.g. ["npx", "sass"]
//! browsers = ["last 2 versions"]     # vendor-prefix targets for styles:build
//! ```

use serde::{Deserialize, Serialize};

/// Which preprocessor compiles `src/scss/*.scss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocessor {
    /// External Dart Sass executable.
    #[default]
    Sass,
    /// Built-in CSS parser: plain CSS with nesting, no Sass syntax.
    Css,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub preprocessor: Preprocessor,

    /// Command prefix used to run Sass.
    pub sass_command: Vec<String>,

    /// Browserslist queries for vendor prefixing.
    pub browsers: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            preprocessor: Preprocessor::Sass,
            sass_command: vec!["sass".into()],
            browsers: vec!["last 2 versions".into()],
        }
    }
}
