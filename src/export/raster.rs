use base64::Engine;

use crate::config::EngineConfig;
use crate::design::state::DesignState;
use crate::foundation::error::{CoverError, CoverResult};
use crate::foundation::math::px_extent;
use crate::geometry::resolver::{GeometryFrame, GeometryResolver};
use crate::layout::placer::{LayoutPlacer, RenderOptions};
use crate::render::backend::{FrameRGBA, RenderBackend, SceneAssets};

/// Bitmap encoding of an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExportFormat {
    /// Lossless print download.
    #[default]
    Png,
    /// Lossy, used for relay deliveries.
    Jpeg {
        /// Quality in `1..=100`.
        quality: u8,
    },
}

impl ExportFormat {
    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// An encoded export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Encoded bitmap.
    pub bytes: Vec<u8>,
}

impl ExportedRaster {
    /// Encode a rendered frame.
    pub fn encode(frame: &FrameRGBA, format: ExportFormat) -> CoverResult<Self> {
        let bytes = match format {
            ExportFormat::Png => frame.encode_png()?,
            ExportFormat::Jpeg { quality } => frame.encode_jpeg(quality)?,
        };
        Ok(Self {
            width: frame.width,
            height: frame.height,
            format,
            bytes,
        })
    }

    /// Encoded bytes as plain base64 (no `data:` prefix).
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Download name, e.g. `cover_30.png`.
    pub fn file_name(&self, book_size_cm: f64) -> String {
        format!("cover_{book_size_cm}.{}", self.format.extension())
    }
}

/// Scale factor from a frame at `current_ppi` to `dpi`.
pub fn export_multiplier(config: &EngineConfig, dpi: f64, current_ppi: f64) -> CoverResult<f64> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(CoverError::validation("export dpi must be finite and > 0"));
    }
    if !current_ppi.is_finite() || current_ppi <= 0.0 {
        return Err(CoverError::validation("current ppi must be finite and > 0"));
    }
    Ok(config.ppi_for_dpi(dpi) / current_ppi)
}

/// Output pixel size of a `dpi` export of a book.
///
/// Depends only on physical size and resolution, never on a preview.
pub fn export_pixel_size(config: &EngineConfig, book_size_cm: f64, dpi: f64) -> (u32, u32) {
    let ppi = config.ppi_for_dpi(dpi);
    let total = book_size_cm * 2.0 + config.spine_width_cm;
    (px_extent(total * ppi), px_extent(book_size_cm * ppi))
}

/// Geometry for a `dpi` export.
pub fn export_frame(
    config: &EngineConfig,
    book_size_cm: f64,
    dpi: f64,
) -> CoverResult<GeometryFrame> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(CoverError::validation("export dpi must be finite and > 0"));
    }
    if !book_size_cm.is_finite() || book_size_cm <= 0.0 {
        return Err(CoverError::validation("book size must be finite and > 0"));
    }
    Ok(GeometryResolver::new(config).for_dpi(book_size_cm, dpi))
}

/// Re-renders a design for print.
///
/// Every export rebuilds the scene with guides hidden, so the preview scene is never touched.
#[derive(Clone, Copy, Debug)]
pub struct ExportRasterizer<'a> {
    config: &'a EngineConfig,
}

impl<'a> ExportRasterizer<'a> {
    /// Build an exporter over engine constants.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Render `state` at `dpi`.
    #[tracing::instrument(skip(self, backend, state, assets), fields(book = state.book_size_cm))]
    pub fn export(
        &self,
        backend: &mut dyn RenderBackend,
        assets: &mut dyn SceneAssets,
        state: &DesignState,
        dpi: f64,
        format: ExportFormat,
    ) -> CoverResult<ExportedRaster> {
        let frame = export_frame(self.config, state.book_size_cm, dpi)?;
        self.render_frame(backend, assets, state, &frame, format)
    }

    /// Render `state` at `preview` scaled by `multiplier`.
    #[tracing::instrument(skip(self, backend, state, assets, preview))]
    pub fn export_scaled(
        &self,
        backend: &mut dyn RenderBackend,
        assets: &mut dyn SceneAssets,
        state: &DesignState,
        preview: &GeometryFrame,
        multiplier: f64,
        format: ExportFormat,
    ) -> CoverResult<ExportedRaster> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(CoverError::validation(
                "export multiplier must be finite and > 0",
            ));
        }
        let frame = preview.scaled(multiplier);
        self.render_frame(backend, assets, state, &frame, format)
    }

    fn render_frame(
        &self,
        backend: &mut dyn RenderBackend,
        assets: &mut dyn SceneAssets,
        state: &DesignState,
        frame: &GeometryFrame,
        format: ExportFormat,
    ) -> CoverResult<ExportedRaster> {
        let scene =
            LayoutPlacer::new(self.config).build_scene(state, frame, RenderOptions::print());
        let raster = backend.render_scene(&scene, assets)?;
        tracing::debug!(
            width = raster.width,
            height = raster.height,
            ppi = frame.ppi,
            "export rendered"
        );
        ExportedRaster::encode(&raster, format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/raster.rs"]
mod tests;
