//! Content transforms.
//!
//! A [`Transform`] turns one file's bytes into new bytes. Stages compose
//! them into a [`TransformChain`]; the first failing step aborts the chain
//! with a [`TransformError`] naming the step and the source file.
//!
//! | Transform        | Used by                 | Backend                 |
//! |------------------|-------------------------|-------------------------|
//! | `SassCompiler`   | styles, styles:build    | external `sass --stdin` |
//! | `CssPreprocessor`| styles, styles:build    | lightningcss            |
//! | `Autoprefixer`   | styles:build            | lightningcss targets    |
//! | `CssMinifier`    | styles:build            | lightningcss            |
//! | `JsMinifier`     | scripts:build           | oxc                     |
//!
//! `SassCompiler` and `CssPreprocessor` are alternatives: both style stages
//! use whichever one `[styles] preprocessor` selects.

mod css;
mod js;
mod sass;

pub use css::{Autoprefixer, CssMinifier, CssPreprocessor, browser_targets};
pub use js::JsMinifier;
#[cfg(test)]
pub(crate) use js::global_bindings;
pub use sass::SassCompiler;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A transform failed on one source file.
#[derive(Debug, Error)]
#[error("{transform} failed on {}: {message}", path.display())]
pub struct TransformError {
    pub transform: &'static str,
    pub path: PathBuf,
    pub message: String,
}

impl TransformError {
    pub fn new(transform: &'static str, path: &Path, message: impl Into<String>) -> Self {
        Self {
            transform,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// A single content transformation step.
pub trait Transform: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Transform `input`. `source` is the file the bytes came from (or the
    /// bundle's first member) and is used for error messages and relative
    /// resolution only.
    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError>;
}

/// Ordered sequence of transforms applied front to back.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the steps, in order.
    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        self.steps
            .iter()
            .try_fold(input, |bytes, step| step.apply(bytes, source))
    }
}

/// Decode transform input as UTF-8 text.
pub(crate) fn utf8(
    transform: &'static str,
    input: Vec<u8>,
    source: &Path,
) -> Result<String, TransformError> {
    String::from_utf8(input)
        .map_err(|_| TransformError::new(transform, source, "input is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;
    impl Transform for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }
        fn apply(&self, input: Vec<u8>, _: &Path) -> Result<Vec<u8>, TransformError> {
            Ok(input.to_ascii_uppercase())
        }
    }

    struct Suffix(&'static str);
    impl Transform for Suffix {
        fn name(&self) -> &'static str {
            "suffix"
        }
        fn apply(&self, mut input: Vec<u8>, _: &Path) -> Result<Vec<u8>, TransformError> {
            input.extend_from_slice(self.0.as_bytes());
            Ok(input)
        }
    }

    struct Fail;
    impl Transform for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn apply(&self, _: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
            Err(TransformError::new("fail", source, "boom"))
        }
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = TransformChain::new().then(Upper).then(Suffix("-x"));
        let out = chain.apply(b"ab".to_vec(), Path::new("a.txt")).unwrap();
        assert_eq!(out, b"AB-x");
        assert_eq!(chain.names(), vec!["upper", "suffix"]);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = TransformChain::new();
        assert!(chain.names().is_empty());
        assert_eq!(chain.apply(b"same".to_vec(), Path::new("a")).unwrap(), b"same");
    }

    #[test]
    fn test_chain_stops_at_failure() {
        let chain = TransformChain::new().then(Fail).then(Suffix("never"));
        let err = chain.apply(b"x".to_vec(), Path::new("src/a.css")).unwrap_err();
        assert_eq!(err.transform, "fail");
        assert_eq!(err.to_string(), "fail failed on src/a.css: boom");
    }

    #[test]
    fn test_utf8_rejects_binary() {
        let err = utf8("css", vec![0xff, 0xfe], Path::new("a.css")).unwrap_err();
        assert!(err.message.contains("UTF-8"));
    }
}
