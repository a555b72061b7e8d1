//! Style stages.
//!
//! Top-level `src/scss/*.scss` files (partials excluded) are compiled one by
//! one and joined in path order into a single `style.css`. The build variant
//! runs the joined result through vendor prefixing and minification.

use anyhow::{Context, Result};

use crate::asset::{SourceFile, discover, write_output};
use crate::config::{Preprocessor, StylesConfig};
use crate::core::SourceSet;
use crate::transform::{
    Autoprefixer, CssMinifier, CssPreprocessor, SassCompiler, Transform, TransformChain,
    browser_targets,
};

use super::{StageContext, StageId, StageReport};

/// Fixed output file name of both style stages.
pub const STYLESHEET_NAME: &str = "style.css";

/// The configured preprocessing transform.
fn preprocessor(config: &StylesConfig) -> Box<dyn Transform> {
    match config.preprocessor {
        Preprocessor::Sass => Box::new(SassCompiler::new(config.sass_command.clone())),
        Preprocessor::Css => Box::new(CssPreprocessor),
    }
}

pub(super) fn run_styles(ctx: &StageContext) -> Result<StageReport> {
    let mut report = StageReport::new(StageId::Styles);
    let files = discover(ctx.layout.root(), &SourceSet::STYLES)?;
    let Some(css) = compile_files(ctx, &files)? else {
        return Ok(report);
    };

    let path = ctx.layout.staging().join("css").join(STYLESHEET_NAME);
    write_output(&path, &css)?;
    report.written.push(path);
    Ok(report)
}

pub(super) fn run_styles_build(ctx: &StageContext) -> Result<StageReport> {
    let mut report = StageReport::new(StageId::StylesBuild);
    let files = discover(ctx.layout.root(), &SourceSet::STYLES)?;
    let Some(css) = compile_files(ctx, &files)? else {
        return Ok(report);
    };

    let targets = browser_targets(&ctx.config.styles.browsers)?;
    let post = TransformChain::new()
        .then(Autoprefixer::new(targets.clone()))
        .then(CssMinifier::new(targets));
    let css = post.apply(css, &files[0].path)?;

    let path = ctx.layout.dist().join("css").join(STYLESHEET_NAME);
    write_output(&path, &css)?;
    report.written.push(path);
    Ok(report)
}

/// Preprocess each source and join the results. `None` when there are no
/// sources.
fn compile_files(ctx: &StageContext, files: &[SourceFile]) -> Result<Option<Vec<u8>>> {
    if files.is_empty() {
        return Ok(None);
    }

    let transform = preprocessor(&ctx.config.styles);
    let mut out = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let source = std::fs::read(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        let css = transform.apply(source, &file.path)?;
        if i > 0 && !out.ends_with(b"\n") {
            out.push(b'\n');
        }
        out.extend_from_slice(&css);
    }
    Ok(Some(out))
}
