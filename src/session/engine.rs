use std::sync::Arc;

use crate::assets::loader::{AssetError, ImageLoader, LoadedImage};
use crate::config::EngineConfig;
use crate::crop::capture::{CropRequest, CropSession};
use crate::design::state::DesignState;
use crate::export::raster::{ExportFormat, ExportRasterizer, ExportedRaster};
use crate::foundation::error::{CoverError, CoverResult};
use crate::geometry::resolver::{DisplayArea, GeometryFrame, GeometryResolver};
use crate::layout::placer::{LayoutPlacer, RenderOptions};
use crate::render::backend::{FrameRGBA, LoaderAssets, RenderBackend, SceneAssets};
use crate::render::cpu::CpuRasterizer;
use crate::scene::graph::SceneGraph;
use crate::session::requests::{Delivery, ImageRequestTracker, ImageTicket};

/// A finished preview render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCover {
    /// Geometry the preview was laid out in.
    pub frame: GeometryFrame,
    /// Surface pixels.
    pub raster: FrameRGBA,
}

/// Cover composition engine.
///
/// Owns the rasterizer and the last preview scene. Every render rebuilds the scene from the
/// design passed in; the engine never keeps or mutates a design of its own.
pub struct CoverEngine<L> {
    config: EngineConfig,
    loader: L,
    backend: CpuRasterizer,
    requests: ImageRequestTracker,
    scene: Option<SceneGraph>,
}

impl<L: ImageLoader> CoverEngine<L> {
    /// Build an engine; the config is validated first.
    pub fn new(config: EngineConfig, loader: L) -> CoverResult<Self> {
        config.validate()?;
        let backend = CpuRasterizer::new().with_system_fonts(config.system_fonts);
        Ok(Self {
            config,
            loader,
            backend,
            requests: ImageRequestTracker::new(),
            scene: None,
        })
    }

    /// Engine constants.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The image loader.
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Geometry of the last preview, if any.
    pub fn current_frame(&self) -> Option<&GeometryFrame> {
        self.scene.as_ref().map(|s| &s.frame)
    }

    /// Scene of the last preview, if any.
    pub fn current_scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    /// Resolve the geometry for `area`, rebuild the scene and render it, loading every image
    /// synchronously.
    ///
    /// Returns `Ok(None)` without touching the previous preview when the area is degenerate.
    #[tracing::instrument(skip(self, state), fields(layout = state.layout.as_str()))]
    pub fn resolve_and_render(
        &mut self,
        area: &DisplayArea,
        state: &DesignState,
    ) -> CoverResult<Option<RenderedCover>> {
        let Some(scene) = self.build_preview(area, state)? else {
            return Ok(None);
        };
        self.loader.retain_only(&scene.asset_references());
        let raster = self
            .backend
            .render_scene(&scene, &mut LoaderAssets::new(&mut self.loader))?;
        let frame = scene.frame;
        self.scene = Some(scene);
        Ok(Some(RenderedCover { frame, raster }))
    }

    /// Rebuild the preview scene and issue one ticket per image it needs.
    ///
    /// Text, guides and placeholders render immediately through [`Self::render_current`];
    /// each image appears once its ticket is delivered. Returns `Ok(None)` when the area is
    /// degenerate.
    #[tracing::instrument(skip(self, state), fields(layout = state.layout.as_str()))]
    pub fn begin_render(
        &mut self,
        area: &DisplayArea,
        state: &DesignState,
    ) -> CoverResult<Option<Vec<ImageTicket>>> {
        let Some(scene) = self.build_preview(area, state)? else {
            return Ok(None);
        };
        self.loader.retain_only(&scene.asset_references());
        let tickets = self
            .requests
            .begin(state.revision(), scene.image_references());
        self.scene = Some(scene);
        Ok(Some(tickets))
    }

    /// Load the image behind a ticket through the engine's loader.
    pub fn load(&mut self, ticket: &ImageTicket) -> Result<LoadedImage, AssetError> {
        self.loader.load_image(&ticket.reference)
    }

    /// Hand a finished load back to the engine. Deliveries from an older render are dropped.
    pub fn deliver(
        &mut self,
        ticket: &ImageTicket,
        result: Result<LoadedImage, AssetError>,
    ) -> Delivery {
        self.requests.deliver(ticket, result)
    }

    /// Whether every image of the current preview has been delivered.
    pub fn is_complete(&self) -> bool {
        self.requests.is_complete()
    }

    /// Render the current preview scene with the images delivered so far.
    pub fn render_current(&mut self) -> CoverResult<Option<FrameRGBA>> {
        let Some(scene) = &self.scene else {
            return Ok(None);
        };
        let mut assets = DeliveredAssets {
            requests: &self.requests,
            loader: &mut self.loader,
        };
        self.backend.render_scene(scene, &mut assets).map(Some)
    }

    /// Render `state` for print at `dpi`. Guides are hidden; the preview is left untouched.
    pub fn export(
        &mut self,
        state: &DesignState,
        dpi: f64,
        format: ExportFormat,
    ) -> CoverResult<ExportedRaster> {
        ExportRasterizer::new(&self.config).export(
            &mut self.backend,
            &mut LoaderAssets::new(&mut self.loader),
            state,
            dpi,
            format,
        )
    }

    /// Render `state` at the last preview's geometry scaled by `multiplier`.
    pub fn export_scaled(
        &mut self,
        state: &DesignState,
        multiplier: f64,
        format: ExportFormat,
    ) -> CoverResult<ExportedRaster> {
        let preview = self
            .scene
            .as_ref()
            .map(|s| s.frame)
            .ok_or_else(|| CoverError::validation("no preview has been rendered yet"))?;
        ExportRasterizer::new(&self.config).export_scaled(
            &mut self.backend,
            &mut LoaderAssets::new(&mut self.loader),
            state,
            &preview,
            multiplier,
            format,
        )
    }

    /// Open a crop session for `reference` against the design's slot.
    ///
    /// Fails when the layout does not crop its main image or the image cannot be loaded.
    pub fn start_crop(&mut self, state: &DesignState, reference: &str) -> CoverResult<CropSession> {
        let request = CropRequest::for_design(state).ok_or_else(|| {
            CoverError::validation(format!(
                "layout '{}' does not crop its main image",
                state.layout.as_str()
            ))
        })?;
        let image = self
            .loader
            .load_image(reference)
            .map_err(|e| CoverError::asset(e.to_string()))?;
        let (w, h) = image.size();
        CropSession::start(w.ceil() as u32, h.ceil() as u32, request, &self.config.crop)
    }

    fn build_preview(
        &self,
        area: &DisplayArea,
        state: &DesignState,
    ) -> CoverResult<Option<SceneGraph>> {
        state.validate()?;
        let Some(frame) = GeometryResolver::new(&self.config).resolve(area, state.book_size_cm)
        else {
            return Ok(None);
        };
        Ok(Some(LayoutPlacer::new(&self.config).build_scene(
            state,
            &frame,
            RenderOptions::default(),
        )))
    }
}

struct DeliveredAssets<'a, L> {
    requests: &'a ImageRequestTracker,
    loader: &'a mut L,
}

impl<L: ImageLoader> SceneAssets for DeliveredAssets<'_, L> {
    fn image(&mut self, reference: &str) -> Result<Option<LoadedImage>, AssetError> {
        match self.requests.get(reference) {
            Some(Ok(img)) => Ok(Some(img.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(None),
        }
    }

    fn font(&mut self, reference: &str) -> Result<Arc<Vec<u8>>, AssetError> {
        self.loader.load_font(reference)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
