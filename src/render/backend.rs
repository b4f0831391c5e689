use std::io::Cursor;

use anyhow::Context;

use crate::assets::loader::{AssetError, ImageLoader, LoadedImage};
use crate::compose::pixel::unpremultiply_rgba8_in_place;
use crate::foundation::error::{CoverError, CoverResult};
use crate::scene::graph::SceneGraph;

/// A rendered surface as RGBA8 pixels.
///
/// Rasterizers produce premultiplied alpha; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Copy with straight (non-premultiplied) alpha.
    pub fn to_straight(&self) -> Self {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        Self {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Encode as PNG with straight alpha.
    pub fn encode_png(&self) -> CoverResult<Vec<u8>> {
        let straight = self.to_straight();
        let img = image::RgbaImage::from_raw(self.width, self.height, straight.data)
            .ok_or_else(|| CoverError::render("frame byte length does not match its size"))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).context("encode frame as png")?;
        Ok(out.into_inner())
    }

    /// Encode as JPEG, dropping alpha.
    pub fn encode_jpeg(&self, quality: u8) -> CoverResult<Vec<u8>> {
        let straight = self.to_straight();
        let img = image::RgbaImage::from_raw(self.width, self.height, straight.data)
            .ok_or_else(|| CoverError::render("frame byte length does not match its size"))?;
        let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
        let mut out = Cursor::new(Vec::new());
        let enc =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
        rgb.write_with_encoder(enc).context("encode frame as jpeg")?;
        Ok(out.into_inner())
    }
}

/// Image and font lookup used while painting a scene.
pub trait SceneAssets {
    /// Decoded image for `reference`.
    ///
    /// `Ok(None)` means the image is not available yet; the node is skipped without fallback.
    fn image(&mut self, reference: &str) -> Result<Option<LoadedImage>, AssetError>;

    /// Font bytes for `reference`.
    fn font(&mut self, reference: &str) -> Result<std::sync::Arc<Vec<u8>>, AssetError>;
}

/// [`SceneAssets`] that loads every image synchronously through an [`ImageLoader`].
pub struct LoaderAssets<'a> {
    loader: &'a mut dyn ImageLoader,
}

impl<'a> LoaderAssets<'a> {
    /// Wrap a loader.
    pub fn new(loader: &'a mut dyn ImageLoader) -> Self {
        Self { loader }
    }
}

impl SceneAssets for LoaderAssets<'_> {
    fn image(&mut self, reference: &str) -> Result<Option<LoadedImage>, AssetError> {
        self.loader.load_image(reference).map(Some)
    }

    fn font(&mut self, reference: &str) -> Result<std::sync::Arc<Vec<u8>>, AssetError> {
        self.loader.load_font(reference)
    }
}

/// Paints a [`SceneGraph`] into a frame.
pub trait RenderBackend {
    /// Rasterize `scene` at its frame's pixel size.
    fn render_scene(
        &mut self,
        scene: &SceneGraph,
        assets: &mut dyn SceneAssets,
    ) -> CoverResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
