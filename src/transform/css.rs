//! Stylesheet transforms backed by lightningcss.

use std::path::Path;

use lightningcss::stylesheet::{
    MinifyOptions, ParserFlags, ParserOptions, PrinterOptions, StyleSheet,
};
use lightningcss::targets::{Browsers, Targets};

use super::{Transform, TransformError, utf8};

/// Resolve browserslist queries (e.g. `last 2 versions`) into targets.
///
/// An empty query list yields default targets, which disables prefixing.
pub fn browser_targets(queries: &[String]) -> anyhow::Result<Targets> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }
    let browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| anyhow::anyhow!("invalid browsers query {queries:?}: {e}"))?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

fn parser_options<'o>(source: &Path) -> ParserOptions<'o> {
    ParserOptions {
        filename: source.to_string_lossy().into_owned(),
        flags: ParserFlags::NESTING,
        ..ParserOptions::default()
    }
}

/// Parse, optionally minify, and print a stylesheet.
fn process(
    name: &'static str,
    input: Vec<u8>,
    source: &Path,
    targets: Targets,
    minify: bool,
) -> Result<Vec<u8>, TransformError> {
    let text = utf8(name, input, source)?;
    let fail = |message: String| TransformError::new(name, source, message);

    let mut stylesheet =
        StyleSheet::parse(&text, parser_options(source)).map_err(|e| fail(e.to_string()))?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;

    let output = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;

    Ok(output.code.into_bytes())
}

/// Plain CSS preprocessor: validates the source and normalizes it.
///
/// Accepts CSS nesting. Used when no external Sass toolchain is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssPreprocessor;

impl Transform for CssPreprocessor {
    fn name(&self) -> &'static str {
        "css"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        let text = utf8(self.name(), input, source)?;
        let stylesheet = StyleSheet::parse(&text, parser_options(source))
            .map_err(|e| TransformError::new(self.name(), source, e.to_string()))?;
        let output = stylesheet
            .to_css(PrinterOptions::default())
            .map_err(|e| TransformError::new(self.name(), source, e.to_string()))?;
        Ok(output.code.into_bytes())
    }
}

/// Adds vendor prefixes required by the configured browser targets.
#[derive(Debug, Clone)]
pub struct Autoprefixer {
    targets: Targets,
}

impl Autoprefixer {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Transform for Autoprefixer {
    fn name(&self) -> &'static str {
        "autoprefix"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        process(self.name(), input, source, self.targets.clone(), false)
    }
}

/// Minifying printer. Keeps the prefixes the targets call for.
#[derive(Debug, Clone, Default)]
pub struct CssMinifier {
    targets: Targets,
}

impl CssMinifier {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Transform for CssMinifier {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        process(self.name(), input, source, self.targets.clone(), true)
    }
}
