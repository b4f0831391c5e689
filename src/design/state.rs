use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::crop::transform::CropTransform;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{CoverError, CoverResult};

/// Text-size presets offered by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScale {
    /// 0.7
    Small,
    /// 0.9
    Medium,
    /// 1.1
    Large,
    /// 1.3
    ExtraLarge,
}

impl TextScale {
    /// Every preset, smallest first.
    pub const ALL: [TextScale; 4] = [
        TextScale::Small,
        TextScale::Medium,
        TextScale::Large,
        TextScale::ExtraLarge,
    ];

    /// Multiplier applied to every font and element size.
    pub fn factor(self) -> f64 {
        match self {
            TextScale::Small => 0.7,
            TextScale::Medium => 0.9,
            TextScale::Large => 1.1,
            TextScale::ExtraLarge => 1.3,
        }
    }

    /// The preset closest to an arbitrary multiplier.
    pub fn nearest(factor: f64) -> Self {
        let mut best = TextScale::Small;
        for preset in Self::ALL {
            if (preset.factor() - factor).abs() < (best.factor() - factor).abs() {
                best = preset;
            }
        }
        best
    }
}

/// Front-panel layout variants. Exactly one is active at a time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// A single icon centered on the front panel.
    Icon,
    /// A single centered text block.
    Text,
    /// A text block stacked above an icon.
    #[default]
    TextIcon,
    /// A natural-aspect, tinted artwork.
    Graphic,
    /// A masked photo slot above a text block.
    PhotoText,
    /// A full-bleed photo with an overlaid two-line title.
    Magazine,
}

impl LayoutVariant {
    /// Every variant in selection order.
    pub const ALL: [Self; 6] = [
        Self::Icon,
        Self::Text,
        Self::TextIcon,
        Self::Graphic,
        Self::PhotoText,
        Self::Magazine,
    ];

    /// Stable identifier used in design files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::Text => "text",
            Self::TextIcon => "text_icon",
            Self::Graphic => "graphic",
            Self::PhotoText => "photo_text",
            Self::Magazine => "magazine",
        }
    }

    /// Whether the variant shows the main image.
    pub fn uses_main_image(self) -> bool {
        matches!(self, Self::Graphic | Self::PhotoText | Self::Magazine)
    }

    /// Whether uploads for this variant go through a crop session.
    pub fn crops_main_image(self) -> bool {
        matches!(self, Self::PhotoText | Self::Magazine)
    }
}

impl std::str::FromStr for LayoutVariant {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CoverError::validation(format!("unknown layout variant '{s}'")))
    }
}

/// Shape of an image mask window.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MaskShape {
    /// Axis-aligned rectangle.
    #[default]
    Rect,
    /// Circle whose diameter is the slot width.
    Circle,
}

/// Physical size of the image slot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlotSize {
    /// Width in cm.
    pub w: f64,
    /// Height in cm.
    pub h: f64,
}

impl SlotSize {
    /// The default square slot used by `photo_text` uploads and circle masks.
    pub const SQUARE_6: Self = Self { w: 6.0, h: 6.0 };

    /// Width over height.
    pub fn aspect(self) -> f64 {
        self.w / self.h
    }
}

impl Default for SlotSize {
    fn default() -> Self {
        Self::SQUARE_6
    }
}

/// Mask choice offered by the crop dialog.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskPreset {
    /// Fixed 6x6 cm circle.
    Circle,
    /// Rectangle with the given physical size.
    Rect {
        /// Width in cm.
        w: f64,
        /// Height in cm.
        h: f64,
    },
}

/// One title line with its own uppercase toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextLine {
    /// Raw text as typed.
    pub text: String,
    /// Render uppercased.
    #[serde(default)]
    pub upper: bool,
}

impl TextLine {
    /// Build a line.
    pub fn new(text: impl Into<String>, upper: bool) -> Self {
        Self {
            text: text.into(),
            upper,
        }
    }

    /// The line as rendered (uppercased when toggled).
    pub fn rendered(&self) -> String {
        if self.upper {
            self.text.to_uppercase()
        } else {
            self.text.clone()
        }
    }
}

/// Which elements appear on the spine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SpineToggles {
    /// Show the icon.
    pub symbol: bool,
    /// Show the title lines.
    pub title: bool,
    /// Show the date.
    pub date: bool,
}

impl Default for SpineToggles {
    fn default() -> Self {
        Self {
            symbol: true,
            title: true,
            date: true,
        }
    }
}

/// Back-panel QR code settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QrSettings {
    /// Whether the QR code is shown.
    pub enabled: bool,
    /// Encoded URL.
    #[serde(default)]
    pub url: String,
}

/// Reference to the main image, carrying its crop once one was applied.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageRef {
    /// Asset reference (relative path or `data:` URL).
    pub source: String,
    /// Crop captured by a crop session; `None` for natural (uncropped) artwork.
    #[serde(default)]
    pub crop: Option<CropTransform>,
}

impl ImageRef {
    /// Natural artwork placed without a crop.
    pub fn natural(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            crop: None,
        }
    }

    /// Cropped photo.
    pub fn cropped(source: impl Into<String>, crop: CropTransform) -> Self {
        Self {
            source: source.into(),
            crop: Some(crop),
        }
    }
}

/// The declarative description of one cover.
///
/// The controller owns a single mutable instance and hands a shared reference to every render;
/// the engine never mutates it. Setters bump [`DesignState::revision`], which tags image loads so
/// that results requested for an older revision can be told apart.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DesignState {
    /// Book edge length (the cover is square per panel).
    pub book_size_cm: f64,
    /// Active front-panel layout.
    pub layout: LayoutVariant,
    /// Cover background.
    pub cover_color: Rgba8,
    /// Text, icon tint and guide color.
    pub text_color: Rgba8,
    /// Font asset reference.
    pub font: String,
    /// Text-scale multiplier.
    pub text_scale: f64,
    /// Spine element toggles.
    pub spine: SpineToggles,
    /// Three title lines.
    pub lines: [TextLine; 3],
    /// Date line.
    pub date: String,
    /// Back-panel copyright.
    pub copyright: String,
    /// Icon asset reference.
    pub icon: Option<String>,
    /// Main image (graphic, photo or magazine).
    pub main_image: Option<ImageRef>,
    /// Back-panel QR code.
    pub qr: QrSettings,
    /// Physical image slot size.
    pub slot: SlotSize,
    /// Slot mask shape.
    pub mask: MaskShape,
    #[serde(skip)]
    revision: u64,
}

impl Default for DesignState {
    fn default() -> Self {
        Self {
            book_size_cm: 30.0,
            layout: LayoutVariant::TextIcon,
            cover_color: Rgba8::WHITE,
            text_color: Rgba8::rgb(0x1a, 0x1a, 0x1a),
            font: "fonts/TenorSans-Regular.ttf".to_string(),
            text_scale: 1.0,
            spine: SpineToggles::default(),
            lines: [
                TextLine::new("THE VISUAL DIARY", true),
                TextLine::default(),
                TextLine::default(),
            ],
            date: String::new(),
            copyright: String::new(),
            icon: None,
            main_image: None,
            qr: QrSettings::default(),
            slot: SlotSize::SQUARE_6,
            mask: MaskShape::Rect,
            revision: 0,
        }
    }
}

impl DesignState {
    /// Parse a design from a JSON reader; missing fields take session-start defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> CoverResult<Self> {
        let state: Self = serde_json::from_reader(r)
            .map_err(|e| CoverError::serde(format!("parse design JSON: {e}")))?;
        state.validate()?;
        Ok(state)
    }

    /// Parse a design from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CoverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CoverError::validation(format!("open design JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check physical values the geometry depends on.
    pub fn validate(&self) -> CoverResult<()> {
        if !self.book_size_cm.is_finite() || self.book_size_cm <= 0.0 {
            return Err(CoverError::validation("book_size_cm must be finite and > 0"));
        }
        if !self.text_scale.is_finite() || self.text_scale <= 0.0 {
            return Err(CoverError::validation("text_scale must be finite and > 0"));
        }
        if !(self.slot.w.is_finite() && self.slot.h.is_finite())
            || self.slot.w <= 0.0
            || self.slot.h <= 0.0
        {
            return Err(CoverError::validation("slot size must be finite and > 0"));
        }
        Ok(())
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record a mutation made through direct field access.
    pub fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Switch layout. Switching to a different variant clears the main image so it has to be
    /// re-uploaded and re-cropped for the new placement; re-selecting the active one is a no-op.
    ///
    /// Returns whether the layout changed.
    pub fn set_layout(&mut self, layout: LayoutVariant) -> bool {
        if self.layout == layout {
            return false;
        }
        tracing::debug!(from = self.layout.as_str(), to = layout.as_str(), "layout change");
        self.layout = layout;
        self.main_image = None;
        self.touch();
        true
    }

    /// Set the book size.
    pub fn set_book_size(&mut self, cm: f64) {
        self.book_size_cm = cm;
        self.touch();
    }

    /// Set cover and text colors together (palette pairs).
    pub fn set_colors(&mut self, cover: Rgba8, text: Rgba8) {
        self.cover_color = cover;
        self.text_color = text;
        self.touch();
    }

    /// Set the font reference.
    pub fn set_font(&mut self, font: impl Into<String>) {
        self.font = font.into();
        self.touch();
    }

    /// Set the text-scale multiplier.
    pub fn set_text_scale(&mut self, scale: f64) {
        self.text_scale = scale;
        self.touch();
    }

    /// Set the text-scale multiplier from a preset.
    pub fn set_text_preset(&mut self, preset: TextScale) {
        self.set_text_scale(preset.factor());
    }

    /// Replace title line `index` (0..3); out-of-range indices are ignored.
    pub fn set_line(&mut self, index: usize, text: impl Into<String>) {
        if let Some(line) = self.lines.get_mut(index) {
            line.text = text.into();
            self.touch();
        }
    }

    /// Toggle uppercase for title line `index`.
    pub fn set_line_upper(&mut self, index: usize, upper: bool) {
        if let Some(line) = self.lines.get_mut(index) {
            line.upper = upper;
            self.touch();
        }
    }

    /// Set the date line.
    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
        self.touch();
    }

    /// Set the copyright line.
    pub fn set_copyright(&mut self, copyright: impl Into<String>) {
        self.copyright = copyright.into();
        self.touch();
    }

    /// Set spine toggles.
    pub fn set_spine(&mut self, spine: SpineToggles) {
        self.spine = spine;
        self.touch();
    }

    /// Set or clear the icon.
    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
        self.touch();
    }

    /// Set the main image (a natural artwork or a freshly applied crop).
    pub fn set_main_image(&mut self, image: ImageRef) {
        self.main_image = Some(image);
        self.touch();
    }

    /// Drop the main image.
    pub fn clear_main_image(&mut self) {
        self.main_image = None;
        self.touch();
    }

    /// Enable the QR code for `url`.
    pub fn enable_qr(&mut self, url: impl Into<String>) {
        self.qr = QrSettings {
            enabled: true,
            url: url.into(),
        };
        self.touch();
    }

    /// Hide the QR code (the URL is kept).
    pub fn disable_qr(&mut self) {
        self.qr.enabled = false;
        self.touch();
    }

    /// Apply a crop-dialog mask choice. Circles are always 6x6 cm.
    pub fn set_crop_mask(&mut self, preset: MaskPreset) {
        match preset {
            MaskPreset::Circle => {
                self.slot = SlotSize::SQUARE_6;
                self.mask = MaskShape::Circle;
            }
            MaskPreset::Rect { w, h } => {
                self.slot = SlotSize { w, h };
                self.mask = MaskShape::Rect;
            }
        }
        self.touch();
    }

    /// Slot reset performed when a new `photo_text` upload starts.
    pub fn reset_slot_for_upload(&mut self) {
        if self.layout == LayoutVariant::PhotoText {
            self.slot = SlotSize::SQUARE_6;
            self.touch();
        }
    }

    /// Whether any title line has content.
    pub fn has_title(&self) -> bool {
        self.lines.iter().any(|l| !l.text.is_empty())
    }

    /// Title lines as rendered, skipping empty ones.
    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(TextLine::rendered)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Total physical width of the unfolded cover (back + spine + front).
    pub fn total_width_cm(&self, spine_width_cm: f64) -> f64 {
        self.book_size_cm * 2.0 + spine_width_cm
    }
}

#[cfg(test)]
#[path = "../../tests/unit/design/state.rs"]
mod tests;
