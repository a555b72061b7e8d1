//! Pass-through stages: `copy`, `fonts:build`, `html:build`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::asset::{SourceFile, copy_output, discover};
use crate::core::SourceSet;
use crate::freshness::needs_update;

use super::{StageContext, StageId, StageReport};

pub(super) fn run_copy(ctx: &StageContext) -> Result<StageReport> {
    mirror_changed(ctx, StageId::Copy, &SourceSet::ALL, &ctx.layout.staging())
}

pub(super) fn run_fonts_build(ctx: &StageContext) -> Result<StageReport> {
    mirror_all(
        ctx,
        StageId::FontsBuild,
        &SourceSet::FONTS,
        &ctx.layout.dist().join("fonts"),
    )
}

pub(super) fn run_html_build(ctx: &StageContext) -> Result<StageReport> {
    mirror_all(ctx, StageId::HtmlBuild, &SourceSet::MARKUP, &ctx.layout.dist())
}

/// Copy sources whose destination is missing or stale.
pub(super) fn mirror_changed(
    ctx: &StageContext,
    stage: StageId,
    set: &SourceSet,
    dest_dir: &Path,
) -> Result<StageReport> {
    let files = discover(ctx.layout.root(), set)?;
    let (stale, fresh): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| needs_update(&f.path, &dest_dir.join(&f.relative)));

    let mut report = StageReport::new(stage);
    report.written = copy_files(&stale, dest_dir)?;
    report.skipped = fresh.len();
    Ok(report)
}

/// Copy every source unconditionally.
pub(super) fn mirror_all(
    ctx: &StageContext,
    stage: StageId,
    set: &SourceSet,
    dest_dir: &Path,
) -> Result<StageReport> {
    let files = discover(ctx.layout.root(), set)?;
    let mut report = StageReport::new(stage);
    report.written = copy_files(&files, dest_dir)?;
    Ok(report)
}

pub(super) fn copy_files(files: &[SourceFile], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    files
        .par_iter()
        .map(|file| {
            let dest = dest_dir.join(&file.relative);
            copy_output(&file.path, &dest)?;
            Ok(dest)
        })
        .collect()
}
