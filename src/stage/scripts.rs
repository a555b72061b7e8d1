//! Script stages.
//!
//! `scripts` ships the single entry `src/js/main.js` unchanged. Pages in
//! the dev tree load it directly, so there is nothing to bundle.
//!
//! `scripts:build` ships every script unchanged and, next to them, a
//! minified bundle of all scripts joined in path order:
//!
//! ```text
//! src/js/a.js          dist/js/a.js
//! src/js/lib/b.js  ->  dist/js/lib/b.js
//! src/js/main.js       dist/js/main.js
//!                      dist/js/main.min.js   (a.js + lib/b.js + main.js, minified)
//! ```

use anyhow::{Context, Result};

use crate::asset::{SourceFile, discover, write_output};
use crate::core::SourceSet;
use crate::transform::{JsMinifier, Transform};

use super::copy::{copy_files, mirror_all};
use super::{StageContext, StageId, StageReport};

/// File name of the production bundle.
pub const BUNDLE_NAME: &str = "main.min.js";

pub(super) fn run_scripts(ctx: &StageContext) -> Result<StageReport> {
    mirror_all(
        ctx,
        StageId::Scripts,
        &SourceSet::SCRIPT_ENTRY,
        &ctx.layout.staging().join("js"),
    )
}

pub(super) fn run_scripts_build(ctx: &StageContext) -> Result<StageReport> {
    let files = discover(ctx.layout.root(), &SourceSet::SCRIPTS)?;
    let dest_dir = ctx.layout.dist().join("js");

    let mut report = StageReport::new(StageId::ScriptsBuild);
    if files.is_empty() {
        return Ok(report);
    }

    let bundle = concat_sources(&files)?;
    let minified = JsMinifier.apply(bundle, &files[0].path)?;

    report.written = copy_files(&files, &dest_dir)?;

    let bundle_path = dest_dir.join(BUNDLE_NAME);
    write_output(&bundle_path, &minified)?;
    report.written.push(bundle_path);
    Ok(report)
}

/// Join sources with a newline, in discovery (path) order.
pub(super) fn concat_sources(files: &[SourceFile]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, file) in files.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        let bytes = std::fs::read(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}
