//! Image compression for the image stages.
//!
//! Each codec gets its own pass:
//!
//! - PNG: lossless re-encode ([`raster`])
//! - GIF: frame-by-frame re-encode of the palette indices, optionally
//!   interlaced ([`raster`])
//! - SVG: usvg normalization and compact serialization ([`svg`])
//! - JPEG: copied as-is. Progressive output needs a coefficient-level
//!   transcoder, and the `image` JPEG encoder only re-encodes lossily.
//!
//! Whatever the codec, the result is never larger than the input: when a
//! pass does not shrink the file the original bytes are kept.

pub mod raster;
pub mod svg;

use std::path::Path;

use crate::transform::{Transform, TransformError};

/// Per-codec compression options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub gif_interlaced: bool,
    /// 0-7, higher is slower and smaller.
    pub png_optimization_level: u8,
    pub svg_remove_view_box: bool,
    pub svg_cleanup_ids: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            gif_interlaced: true,
            png_optimization_level: 5,
            svg_remove_view_box: true,
            svg_cleanup_ids: false,
        }
    }
}

/// Image codec, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Png,
    Jpeg,
    Gif,
    Svg,
}

impl Codec {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor {
    options: CodecOptions,
}

impl ImageCompressor {
    /// Compress one image. Unknown extensions pass through.
    pub fn compress(&self, path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>, TransformError> {
        let fail = |e: anyhow::Error| TransformError::new("imagemin", path, format!("{e:#}"));

        let compressed = match Codec::from_path(path) {
            Some(Codec::Png) => {
                raster::recompress_png(&bytes, self.options.png_optimization_level).map_err(fail)?
            }
            Some(Codec::Gif) => {
                raster::recompress_gif(&bytes, self.options.gif_interlaced).map_err(fail)?
            }
            Some(Codec::Svg) => svg::optimize_svg(&bytes, &self.options).map_err(fail)?,
            Some(Codec::Jpeg) | None => return Ok(bytes),
        };

        Ok(smaller_of(bytes, compressed))
    }
}

impl Transform for ImageCompressor {
    fn name(&self) -> &'static str {
        "imagemin"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        self.compress(source, input)
    }
}

/// Keep the original unless the candidate is strictly smaller.
fn smaller_of(original: Vec<u8>, candidate: Vec<u8>) -> Vec<u8> {
    if candidate.len() < original.len() {
        candidate
    } else {
        original
    }
}
