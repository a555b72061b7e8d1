//! Lossless raster re-encoding.

use std::borrow::Cow;
use std::io::Cursor;

use anyhow::{Context, Result};
use image::ImageFormat;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

/// Map an optimization level (0-7) onto the encoder's compression presets.
fn compression_for(level: u8) -> CompressionType {
    match level {
        0 | 1 => CompressionType::Fast,
        2..=4 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Decode and re-encode a PNG with stronger deflate settings.
///
/// Pixels are preserved exactly; ancillary chunks (text, timestamps) are
/// dropped. The caller decides whether the result is worth keeping.
pub fn recompress_png(bytes: &[u8], level: u8) -> Result<Vec<u8>> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .context("Failed to decode PNG")?;

    let mut out = Vec::with_capacity(bytes.len());
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut out),
        compression_for(level),
        FilterType::Adaptive,
    );
    image
        .write_with_encoder(encoder)
        .context("Failed to encode PNG")?;

    Ok(out)
}

/// Re-encode a GIF frame by frame from its palette indices.
///
/// Palettes, timing, disposal and the loop count carry over, so the
/// decoded frames are identical. With `interlaced` the rows of every frame
/// are written in the four-pass interlace order.
pub fn recompress_gif(bytes: &[u8], interlaced: bool) -> Result<Vec<u8>> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(bytes).context("Failed to decode GIF")?;

    let mut frames = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .context("Failed to decode GIF frame")?
    {
        frames.push(frame.clone());
    }

    let global_palette = decoder.global_palette().unwrap_or_default();
    let mut encoder = gif::Encoder::new(
        Vec::with_capacity(bytes.len()),
        decoder.width(),
        decoder.height(),
        global_palette,
    )
    .context("Failed to encode GIF")?;
    encoder
        .set_repeat(decoder.repeat())
        .context("Failed to encode GIF")?;

    for mut frame in frames {
        // Decoded buffers are always in display order
        if interlaced {
            let (width, height) = (usize::from(frame.width), usize::from(frame.height));
            frame.buffer = Cow::Owned(interlace_rows(&frame.buffer, width, height));
        }
        frame.interlaced = interlaced;
        encoder
            .write_frame(&frame)
            .context("Failed to encode GIF frame")?;
    }

    encoder.into_inner().context("Failed to encode GIF")
}

/// Reorder display-order rows into GIF interlace order.
fn interlace_rows(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

    let mut out = Vec::with_capacity(pixels.len());
    for (start, step) in PASSES {
        for row in (start..height).step_by(step) {
            out.extend_from_slice(&pixels[row * width..(row + 1) * width]);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba, RgbaImage};

    /// A two-color checkerboard GIF, written without interlacing.
    pub(crate) fn sample_gif(width: u16, height: u16) -> Vec<u8> {
        let palette = [255, 0, 0, 0, 0, 255];
        let pixels: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x / 4 + y / 4) % 2) as u8))
            .collect();
        let frame = gif::Frame {
            width,
            height,
            buffer: Cow::Owned(pixels),
            ..gif::Frame::default()
        };

        let mut encoder = gif::Encoder::new(Vec::new(), width, height, &palette).unwrap();
        encoder.write_frame(&frame).unwrap();
        encoder.into_inner().unwrap()
    }

    /// Palette indices of every frame, in display order.
    pub(crate) fn gif_indices(bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut decoder = gif::DecodeOptions::new().read_info(bytes).unwrap();
        let mut frames = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            frames.push(frame.buffer.to_vec());
        }
        frames
    }

    fn first_frame_interlaced(bytes: &[u8]) -> bool {
        let mut decoder = gif::DecodeOptions::new().read_info(bytes).unwrap();
        decoder.next_frame_info().unwrap().unwrap().interlaced
    }

    /// A small PNG encoded with the fastest, least compact settings.
    pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    #[test]
    fn test_compression_for_level() {
        assert!(matches!(compression_for(0), CompressionType::Fast));
        assert!(matches!(compression_for(3), CompressionType::Default));
        assert!(matches!(compression_for(5), CompressionType::Best));
        assert!(matches!(compression_for(7), CompressionType::Best));
    }

    #[test]
    fn test_recompress_preserves_pixels() {
        let png = sample_png(32, 32);
        let out = recompress_png(&png, 5).unwrap();

        let before = image::load_from_memory(&png).unwrap().to_rgba8();
        let after = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(before.dimensions(), after.dimensions());
        assert_eq!(before.as_raw(), after.as_raw());
    }

    #[test]
    fn test_recompress_rejects_garbage() {
        assert!(recompress_png(b"garbage", 5).is_err());
        assert!(recompress_gif(b"garbage", true).is_err());
    }

    #[test]
    fn test_interlace_rows_order() {
        let pixels: Vec<u8> = (0..10).collect();
        assert_eq!(interlace_rows(&pixels, 1, 10), vec![0, 8, 4, 2, 6, 1, 3, 5, 7, 9]);

        let wide: Vec<u8> = (0..6).collect();
        assert_eq!(interlace_rows(&wide, 2, 3), vec![0, 1, 4, 5, 2, 3]);
    }

    #[test]
    fn test_recompress_gif_interlaced() {
        let gif = sample_gif(20, 13);
        assert!(!first_frame_interlaced(&gif));

        let out = recompress_gif(&gif, true).unwrap();
        assert!(first_frame_interlaced(&out));
        assert_eq!(gif_indices(&out), gif_indices(&gif));
    }

    #[test]
    fn test_recompress_gif_plain() {
        let gif = sample_gif(16, 16);
        let out = recompress_gif(&gif, false).unwrap();
        assert!(!first_frame_interlaced(&out));
        assert_eq!(gif_indices(&out), gif_indices(&gif));
    }
}
