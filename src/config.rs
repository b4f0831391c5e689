use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{CoverError, CoverResult};

/// Engine-wide constants: physical dimensions, typography and crop reference frame.
///
/// Every physical length is in centimeters and converted to pixels through the current
/// [`crate::GeometryFrame::ppi`], so preview and export share the same formulas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed spine width.
    pub spine_width_cm: f64,
    /// Supersampling factor applied on top of the display-fitting base ppi.
    pub render_scale: f64,
    /// Default print resolution for [`crate::CoverEngine::export`].
    pub export_dpi: f64,
    /// Centimeters per inch.
    pub cm_per_inch: f64,
    /// Largest supported book size; desktop previews are pinned to it.
    pub max_reference_size_cm: f64,
    /// Lower bound for the desktop base ppi.
    pub min_base_ppi: f64,
    /// Margin kept free on every side of the display container.
    pub display_margin_px: f64,
    /// Upward offset of the `graphic` image from the vertical center.
    pub graphic_offset_cm: f64,
    /// Upward offset of the `photo_text` slot from the vertical center.
    pub photo_slot_offset_cm: f64,
    /// Gap between the `photo_text` slot bottom and its text block.
    pub photo_text_gap_cm: f64,
    /// Distance of the spine/back base line from the bottom edge.
    pub bottom_base_cm: f64,
    /// Base gap between stacked front-panel elements.
    pub block_gap_cm: f64,
    /// Gap between the title block and the icon in `text_icon`, as a multiple of the block gap.
    pub icon_gap_factor: f64,
    /// Front-panel icon width before the text-scale multiplier.
    pub icon_size_cm: f64,
    /// Spine icon width.
    pub spine_icon_cm: f64,
    /// How far spine text starts above the base line when the spine icon is shown.
    pub spine_icon_clearance_cm: f64,
    /// Back-panel QR code side length.
    pub qr_size_cm: f64,
    /// Distance of the QR code bottom above the base line.
    pub qr_lift_cm: f64,
    /// Distance of the magazine title from the top edge.
    pub magazine_top_cm: f64,
    /// Text typography.
    pub typography: Typography,
    /// Title shown (at ghost opacity) when no title line has content.
    pub ghost_title: String,
    /// Date shown (at ghost opacity) when the date is empty.
    pub ghost_date: String,
    /// Opacity of ghost text and ghost icons.
    pub ghost_opacity: f32,
    /// Separator between spine parts.
    pub spine_separator: String,
    /// Icon drawn when no icon is set or the icon fails to load.
    pub fallback_icon: Option<String>,
    /// Font tried when the design's font is missing or unparsable.
    pub fallback_font: Option<String>,
    /// Fall back to an installed sans-serif face when neither font loads.
    pub system_fonts: bool,
    /// Panel boundary guides.
    pub guides: GuideStyle,
    /// Empty image-slot placeholder.
    pub placeholder: PlaceholderStyle,
    /// Crop reference frame.
    pub crop: CropConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spine_width_cm: 1.5,
            render_scale: 3.0,
            export_dpi: 300.0,
            cm_per_inch: 2.54,
            max_reference_size_cm: 30.0,
            min_base_ppi: 5.0,
            display_margin_px: 20.0,
            graphic_offset_cm: 2.0,
            photo_slot_offset_cm: 2.0,
            photo_text_gap_cm: 1.5,
            bottom_base_cm: 1.5,
            block_gap_cm: 2.0,
            icon_gap_factor: 1.5,
            icon_size_cm: 1.25,
            spine_icon_cm: 1.0,
            spine_icon_clearance_cm: 1.8,
            qr_size_cm: 1.2,
            qr_lift_cm: 1.35,
            magazine_top_cm: 2.0,
            typography: Typography::default(),
            ghost_title: "THE VISUAL DIARY".to_string(),
            ghost_date: "2025".to_string(),
            ghost_opacity: 0.3,
            spine_separator: " \u{2022} ".to_string(),
            fallback_icon: Some("symbols/love_heart_icon.png".to_string()),
            fallback_font: None,
            system_fonts: true,
            guides: GuideStyle::default(),
            placeholder: PlaceholderStyle::default(),
            crop: CropConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON reader; missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> CoverResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CoverError::serde(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CoverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CoverError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply `COVERCRAFT_*` environment overrides.
    ///
    /// Unparsable or non-positive values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        fn positive(name: &str) -> Option<f64> {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
        }

        if let Some(v) = positive("COVERCRAFT_GRAPHIC_OFFSET_CM") {
            self.graphic_offset_cm = v;
        }
        if let Some(v) = positive("COVERCRAFT_EXPORT_DPI") {
            self.export_dpi = v;
        }
        if let Some(v) = positive("COVERCRAFT_RENDER_SCALE") {
            self.render_scale = v;
        }
        self
    }

    /// Reject configs that would make geometry degenerate.
    pub fn validate(&self) -> CoverResult<()> {
        let positive = [
            ("spine_width_cm", self.spine_width_cm),
            ("render_scale", self.render_scale),
            ("export_dpi", self.export_dpi),
            ("cm_per_inch", self.cm_per_inch),
            ("max_reference_size_cm", self.max_reference_size_cm),
            ("crop.frame_size", self.crop.frame_size),
            ("crop.window_max", self.crop.window_max),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(CoverError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if self.crop.window_max > self.crop.frame_size {
            return Err(CoverError::validation(
                "crop.window_max must not exceed crop.frame_size",
            ));
        }
        if !self.crop.max_zoom_factor.is_finite() || self.crop.max_zoom_factor < 1.0 {
            return Err(CoverError::validation("crop.max_zoom_factor must be >= 1"));
        }
        Ok(())
    }

    /// Pixels per centimeter for a print resolution.
    pub fn ppi_for_dpi(&self, dpi: f64) -> f64 {
        dpi / self.cm_per_inch
    }
}

/// Font sizes (in cm before the text-scale multiplier) and text metrics.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Typography {
    /// Title size of the full text block (`text` layout).
    pub base_title: f64,
    /// Title size of the compact text block (`text_icon`, `photo_text`).
    pub compact_title: f64,
    /// Date and spine text size.
    pub base_details: f64,
    /// Copyright size.
    pub base_copy: f64,
    /// Magazine title size.
    pub magazine_title: f64,
    /// Line advance as a multiple of the glyph box height.
    pub line_height: f64,
    /// Line advance of the magazine title.
    pub magazine_line_height: f64,
    /// Glyph box height as a multiple of the font size.
    pub glyph_box: f64,
    /// Gap between title and date in the full block.
    pub date_gap_cm: f64,
    /// Gap between title and date in the compact block.
    pub compact_date_gap_cm: f64,
    /// Copyright tracking in em.
    pub copyright_letter_spacing_em: f64,
    /// Copyright opacity.
    pub copyright_opacity: f32,
    /// Magazine title shadow color.
    pub shadow_color: crate::foundation::core::Rgba8,
    /// Magazine title shadow blur.
    pub shadow_blur_cm: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            base_title: 1.2,
            compact_title: 0.8,
            base_details: 0.5,
            base_copy: 0.35,
            magazine_title: 2.5,
            line_height: 1.3,
            magazine_line_height: 1.0,
            glyph_box: 1.13,
            date_gap_cm: 2.0,
            compact_date_gap_cm: 1.0,
            copyright_letter_spacing_em: 0.05,
            copyright_opacity: 0.7,
            shadow_color: crate::foundation::core::Rgba8::new(0, 0, 0, 38),
            shadow_blur_cm: 0.07,
        }
    }
}

/// Dashed panel boundary guides (never printed).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GuideStyle {
    /// Guide opacity, drawn in the text color.
    pub opacity: f32,
    /// Stroke width.
    pub stroke_cm: f64,
    /// Dash and gap length.
    pub dash_cm: f64,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            opacity: 0.3,
            stroke_cm: 0.035,
            dash_cm: 0.18,
        }
    }
}

/// Interactive placeholder drawn where an image is expected but missing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    /// Outline and "+" color.
    pub color: crate::foundation::core::Rgba8,
    /// Outline stroke width.
    pub stroke_cm: f64,
    /// Outline dash and gap length.
    pub dash_cm: f64,
    /// Diameter of the centered "+" button circle.
    pub button_cm: f64,
    /// Thickness of the "+" bars.
    pub plus_thickness_cm: f64,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            color: crate::foundation::core::Rgba8::rgb(0xaa, 0xaa, 0xaa),
            stroke_cm: 0.027,
            dash_cm: 0.18,
            button_cm: 1.5,
            plus_thickness_cm: 0.05,
        }
    }
}

/// Fixed square reference frame in which crop sessions are captured.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Side length of the square reference frame.
    pub frame_size: f64,
    /// Long side of the mask window inside the frame.
    pub window_max: f64,
    /// Maximum zoom as a multiple of the cover scale.
    pub max_zoom_factor: f64,
    /// Zoom slider step as a fraction of the cover scale.
    pub zoom_step_fraction: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            frame_size: 500.0,
            window_max: 400.0,
            max_zoom_factor: 4.0,
            zoom_step_fraction: 0.01,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
