//! Image stages: `images` (dev, change-aware) and `images:build`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::asset::{SourceFile, discover, write_output};
use crate::core::SourceSet;
use crate::freshness::needs_update;
use crate::image::ImageCompressor;
use crate::transform::Transform;

use super::{StageContext, StageId, StageReport};

pub(super) fn run_images(ctx: &StageContext) -> Result<StageReport> {
    let dest_dir = ctx.layout.staging().join("img");
    let files = discover(ctx.layout.root(), &SourceSet::IMAGES)?;
    let (stale, fresh): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| needs_update(&f.path, &dest_dir.join(&f.relative)));

    let mut report = StageReport::new(StageId::Images);
    report.written = compress_files(&stale, &dest_dir)?;
    report.skipped = fresh.len();
    Ok(report)
}

pub(super) fn run_images_build(ctx: &StageContext) -> Result<StageReport> {
    let dest_dir = ctx.layout.dist().join("img");
    let files = discover(ctx.layout.root(), &SourceSet::IMAGES)?;

    let mut report = StageReport::new(StageId::ImagesBuild);
    report.written = compress_files(&files, &dest_dir)?;
    Ok(report)
}

fn compress_files(files: &[SourceFile], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let compressor = ImageCompressor::default();
    files
        .par_iter()
        .map(|file| {
            let bytes = std::fs::read(&file.path)
                .with_context(|| format!("failed to read {}", file.path.display()))?;
            let original = bytes.len();
            let compressed = compressor.apply(bytes, &file.path)?;
            crate::debug!("images"; "{}: {} -> {} bytes", file.relative.display(), original, compressed.len());

            let dest = dest_dir.join(&file.relative);
            write_output(&dest, &compressed)?;
            Ok(dest)
        })
        .collect()
}
