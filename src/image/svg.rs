//! SVG cleanup using usvg.
//!
//! The document is parsed into usvg's normalized tree and written back
//! without indentation. Element ids survive the round trip unless
//! `svg_cleanup_ids` is set, which drops ids nothing in the document
//! references. A root `viewBox` that only restates the width and height is
//! dropped when requested.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};

use super::CodecOptions;

/// Optimize SVG bytes.
///
/// Documents containing `<text>` are returned unchanged: usvg is built
/// without a font database and would drop the text.
pub fn optimize_svg(content: &[u8], options: &CodecOptions) -> Result<Vec<u8>> {
    if contains_text(content) {
        return Ok(content.to_vec());
    }

    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    let mut optimized = tree.to_string(&write_options);

    if options.svg_cleanup_ids {
        optimized = remove_unreferenced_ids(&optimized);
    }
    if options.svg_remove_view_box {
        optimized = remove_redundant_view_box(&optimized);
    }

    Ok(optimized.into_bytes())
}

fn contains_text(content: &[u8]) -> bool {
    content.windows(5).any(|w| w == b"<text")
}

/// Drop `id` attributes no `url(#id)` or `href="#id"` points at.
fn remove_unreferenced_ids(svg: &str) -> String {
    static ID_ATTR: OnceLock<Regex> = OnceLock::new();
    let re = ID_ATTR.get_or_init(|| Regex::new(r#" id="([^"]*)""#).unwrap());

    re.replace_all(svg, |caps: &Captures| {
        let id = &caps[1];
        let referenced =
            svg.contains(&format!("url(#{id})")) || svg.contains(&format!("\"#{id}\""));
        if referenced { caps[0].to_string() } else { String::new() }
    })
    .into_owned()
}

/// Drop the root `viewBox` when it equals `0 0 width height`.
fn remove_redundant_view_box(svg: &str) -> String {
    let Some(root_end) = svg.find("<svg").and_then(|s| svg[s..].find('>').map(|e| s + e)) else {
        return svg.to_string();
    };
    let root = &svg[..root_end];

    let (Some(width), Some(height), Some(view_box)) = (
        extract_attr(root, r#" width=""#),
        extract_attr(root, r#" height=""#),
        extract_attr(root, r#" viewBox=""#),
    ) else {
        return svg.to_string();
    };

    let parts: Vec<f32> = view_box
        .split([' ', ','])
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    let (Ok(w), Ok(h)) = (width.parse::<f32>(), height.parse::<f32>()) else {
        return svg.to_string();
    };
    if parts != [0.0, 0.0, w, h] {
        return svg.to_string();
    }

    let attr = format!(r#" viewBox="{view_box}""#);
    svg.replacen(&attr, "", 1)
}

/// Extract attribute value between prefix and closing quote
#[inline]
fn extract_attr<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let start = s.find(prefix)? + prefix.len();
    let end = start + s.as_bytes()[start..].iter().position(|&b| b == b'"')?;
    Some(&s[start..end])
}
