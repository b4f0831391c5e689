use std::sync::Arc;

use anyhow::Context;

use crate::compose::pixel::premultiply_rgba8_in_place;
use crate::foundation::error::CoverResult;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

/// Decode any format supported by `image` (PNG, JPEG, ...).
pub fn decode_image(bytes: &[u8]) -> CoverResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage::from_premul(width, height, rgba8_premul))
}

/// Parse an SVG document.
pub fn parse_svg(bytes: &[u8]) -> CoverResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(Arc::new(tree))
}

/// Whether `bytes` look like an SVG document rather than a raster image.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
