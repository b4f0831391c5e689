use crate::foundation::error::{CoverError, CoverResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<crate::foundation::core::Rgba8> for TextBrushRgba8 {
    fn from(c: crate::foundation::core::Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One shaped line: its layout and measured extent.
pub(crate) struct ShapedLine {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Fonts are registered once per font reference.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: std::collections::HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: std::collections::HashMap::new(),
        }
    }

    pub(crate) fn family_for(&mut self, font_ref: &str, font_bytes: &[u8]) -> CoverResult<String> {
        if let Some(name) = self.families.get(font_ref) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| CoverError::asset("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CoverError::asset("registered font family has no name"))?
            .to_string();
        self.families.insert(font_ref.to_string(), name.clone());
        Ok(name)
    }

    /// Shape a single line without wrapping.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font_ref: &str,
        font_bytes: &[u8],
        size_px: f32,
        letter_spacing_px: f32,
        brush: TextBrushRgba8,
    ) -> CoverResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CoverError::validation("text size_px must be finite and > 0"));
        }
        let family_name = self.family_for(font_ref, font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if letter_spacing_px != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                letter_spacing_px,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        let width = f64::from(layout.width());
        let height = f64::from(layout.height());
        Ok(ShapedLine {
            layout,
            width,
            height,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
