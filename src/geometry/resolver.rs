use crate::config::EngineConfig;
use crate::foundation::core::Rect;
use crate::foundation::math::px_extent;

/// How the base scale is chosen for a display container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportPolicy {
    /// Pin the scale to the largest supported book so smaller books visibly shrink.
    #[default]
    Desktop,
    /// Fit the current book to the container.
    Mobile,
}

/// Pixel dimensions of the container the preview is shown in.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayArea {
    /// Container width in CSS pixels.
    pub width_px: f64,
    /// Container height in CSS pixels.
    pub height_px: f64,
    /// Scale policy.
    pub policy: ViewportPolicy,
}

impl DisplayArea {
    /// Desktop container.
    pub fn desktop(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
            policy: ViewportPolicy::Desktop,
        }
    }

    /// Mobile container.
    pub fn mobile(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
            policy: ViewportPolicy::Mobile,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width_px.is_finite() && self.height_px.is_finite())
            || self.width_px <= 0.0
            || self.height_px <= 0.0
    }
}

/// Physical-to-pixel geometry of one render. Recomputed on every render, never patched.
///
/// Panels run left to right: back, spine, front.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GeometryFrame {
    /// Pixels per centimeter of the render surface (`base_ppi * render_scale` for previews).
    pub ppi: f64,
    /// Display-fitting pixels per centimeter before supersampling.
    pub base_ppi: f64,
    /// Book edge length.
    pub book_size_cm: f64,
    /// Spine width.
    pub spine_width_cm: f64,
    /// Surface width.
    pub width_px: f64,
    /// Surface height.
    pub height_px: f64,
    /// Boundary between back panel and spine.
    pub back_spine_x: f64,
    /// Boundary between spine and front panel.
    pub spine_front_x: f64,
    /// Spine center.
    pub spine_center_x: f64,
    /// Front panel center.
    pub front_center_x: f64,
    /// Back panel center.
    pub back_center_x: f64,
    /// Vertical center.
    pub center_y: f64,
}

impl GeometryFrame {
    /// Lay out the three panels at a given pixel density.
    pub fn from_ppi(book_size_cm: f64, spine_width_cm: f64, ppi: f64, base_ppi: f64) -> Self {
        let panel = book_size_cm * ppi;
        let back_spine_x = panel;
        let spine_front_x = (book_size_cm + spine_width_cm) * ppi;
        let width_px = (book_size_cm * 2.0 + spine_width_cm) * ppi;
        let height_px = book_size_cm * ppi;
        Self {
            ppi,
            base_ppi,
            book_size_cm,
            spine_width_cm,
            width_px,
            height_px,
            back_spine_x,
            spine_front_x,
            spine_center_x: back_spine_x + (spine_front_x - back_spine_x) / 2.0,
            front_center_x: spine_front_x + panel / 2.0,
            back_center_x: panel / 2.0,
            center_y: height_px / 2.0,
        }
    }

    /// Convert centimeters to surface pixels.
    pub fn cm(&self, v: f64) -> f64 {
        v * self.ppi
    }

    /// Width (= height) of a front or back panel in pixels.
    pub fn panel_px(&self) -> f64 {
        self.book_size_cm * self.ppi
    }

    /// Unfolded physical width.
    pub fn total_width_cm(&self) -> f64 {
        self.book_size_cm * 2.0 + self.spine_width_cm
    }

    /// Front panel rectangle.
    pub fn front_panel(&self) -> Rect {
        Rect::new(self.spine_front_x, 0.0, self.width_px, self.height_px)
    }

    /// Spine rectangle.
    pub fn spine_panel(&self) -> Rect {
        Rect::new(self.back_spine_x, 0.0, self.spine_front_x, self.height_px)
    }

    /// Back panel rectangle.
    pub fn back_panel(&self) -> Rect {
        Rect::new(0.0, 0.0, self.back_spine_x, self.height_px)
    }

    /// Integer raster size of the surface.
    pub fn pixel_size(&self) -> (u32, u32) {
        (px_extent(self.width_px), px_extent(self.height_px))
    }

    /// On-screen (CSS) size of the surface, before supersampling.
    pub fn display_size(&self) -> (f64, f64) {
        (
            self.total_width_cm() * self.base_ppi,
            self.book_size_cm * self.base_ppi,
        )
    }

    /// The same cover at `mult` times the pixel density.
    pub fn scaled(&self, mult: f64) -> Self {
        Self::from_ppi(
            self.book_size_cm,
            self.spine_width_cm,
            self.ppi * mult,
            self.base_ppi,
        )
    }
}

/// Chooses the pixel density for a container and book size.
#[derive(Clone, Copy, Debug)]
pub struct GeometryResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> GeometryResolver<'a> {
    /// Build a resolver over engine constants.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve the preview geometry, or `None` when the container has no usable area (the
    /// render is skipped).
    pub fn resolve(&self, area: &DisplayArea, book_size_cm: f64) -> Option<GeometryFrame> {
        if area.is_degenerate() || !book_size_cm.is_finite() || book_size_cm <= 0.0 {
            tracing::debug!(?area, book_size_cm, "degenerate display area, skipping render");
            return None;
        }
        let cfg = self.config;
        let margin = cfg.display_margin_px * 2.0;
        let avail_w = area.width_px - margin;
        let avail_h = area.height_px - margin;

        let base_ppi = match area.policy {
            ViewportPolicy::Desktop => {
                let ref_w = cfg.max_reference_size_cm * 2.0 + cfg.spine_width_cm;
                let ref_h = cfg.max_reference_size_cm;
                (avail_w / ref_w).min(avail_h / ref_h).max(cfg.min_base_ppi)
            }
            ViewportPolicy::Mobile => {
                let cur_w = book_size_cm * 2.0 + cfg.spine_width_cm;
                (avail_w / cur_w).min(avail_h / book_size_cm)
            }
        };
        if !base_ppi.is_finite() || base_ppi <= 0.0 {
            tracing::debug!(base_ppi, "container smaller than its margins, skipping render");
            return None;
        }

        let frame = GeometryFrame::from_ppi(
            book_size_cm,
            cfg.spine_width_cm,
            base_ppi * cfg.render_scale,
            base_ppi,
        );
        tracing::debug!(
            ppi = frame.ppi,
            base_ppi,
            width = frame.width_px,
            height = frame.height_px,
            "geometry resolved"
        );
        Some(frame)
    }

    /// Geometry of a print export at `dpi`, independent of any preview.
    pub fn for_dpi(&self, book_size_cm: f64, dpi: f64) -> GeometryFrame {
        let ppi = self.config.ppi_for_dpi(dpi);
        GeometryFrame::from_ppi(
            book_size_cm,
            self.config.spine_width_cm,
            ppi,
            ppi / self.config.render_scale,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
