//! Text content and block metrics shared by every layout variant.
//!
//! Heights are estimated from the font size alone (a glyph box of `glyph_box` em per line,
//! consecutive lines `line_height` boxes apart) so placement never depends on font loading.

use crate::config::EngineConfig;
use crate::design::state::DesignState;

/// Lines of a text block with the opacity they are shown at.
#[derive(Clone, Debug, PartialEq)]
pub struct TextContent {
    /// Lines, top to bottom.
    pub lines: Vec<String>,
    /// Opacity (reduced for ghost text).
    pub opacity: f32,
    /// Whether this is placeholder content.
    pub ghost: bool,
}

/// Height of `n` lines of `size_px` text.
pub fn block_height(size_px: f64, lines: usize, line_height: f64, glyph_box: f64) -> f64 {
    let n = lines.max(1) as f64;
    size_px * glyph_box * (line_height * (n - 1.0) + 1.0)
}

/// Title lines of the front-panel block.
///
/// With no content on any line, the ghost title is used, padded with three empty lines so the
/// block keeps the weight of a full title.
pub fn title_content(state: &DesignState, cfg: &EngineConfig) -> TextContent {
    if state.has_title() {
        return TextContent {
            lines: state.rendered_lines(),
            opacity: 1.0,
            ghost: false,
        };
    }
    let mut lines = vec![cfg.ghost_title.clone()];
    lines.extend(std::iter::repeat_n(String::new(), 3));
    TextContent {
        lines,
        opacity: cfg.ghost_opacity,
        ghost: true,
    }
}

/// Date line under the title, falling back to the ghost date.
pub fn date_content(state: &DesignState, cfg: &EngineConfig) -> Option<TextContent> {
    if !state.date.is_empty() {
        return Some(TextContent {
            lines: vec![state.date.clone()],
            opacity: 1.0,
            ghost: false,
        });
    }
    if cfg.ghost_date.is_empty() {
        return None;
    }
    Some(TextContent {
        lines: vec![cfg.ghost_date.clone()],
        opacity: cfg.ghost_opacity,
        ghost: true,
    })
}

/// The two magazine headline lines (only the first two title lines take part).
pub fn magazine_content(state: &DesignState, cfg: &EngineConfig) -> TextContent {
    let lines: Vec<String> = state.lines[..2]
        .iter()
        .map(|l| l.rendered())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return TextContent {
            lines: vec![cfg.ghost_title.clone()],
            opacity: cfg.ghost_opacity,
            ghost: true,
        };
    }
    TextContent {
        lines,
        opacity: 1.0,
        ghost: false,
    }
}

/// Spine string: enabled title lines joined by spaces, then the date, joined by `separator`.
///
/// Returns `None` when nothing is enabled or everything enabled is empty.
pub fn spine_text(state: &DesignState, separator: &str) -> Option<String> {
    let mut parts = Vec::with_capacity(2);
    if state.spine.title {
        let title = state.rendered_lines();
        if !title.is_empty() {
            parts.push(title.join(" "));
        }
    }
    if state.spine.date && !state.date.is_empty() {
        parts.push(state.date.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

/// Metrics of a title block with an optional date below it.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleBlock {
    /// Title lines.
    pub title: TextContent,
    /// Title font size.
    pub title_size_px: f64,
    /// Title height.
    pub title_height: f64,
    /// Date line.
    pub date: Option<TextContent>,
    /// Date font size.
    pub date_size_px: f64,
    /// Gap between title and date.
    pub date_gap_px: f64,
    /// Height of the whole group.
    pub height: f64,
}

impl TitleBlock {
    /// Measure the block at `ppi`. The compact block (`text_icon`, `photo_text`) has a smaller
    /// title and a tighter date gap.
    pub fn measure(state: &DesignState, cfg: &EngineConfig, ppi: f64, compact: bool) -> Self {
        let typo = &cfg.typography;
        let base = if compact {
            typo.compact_title
        } else {
            typo.base_title
        };
        let title = title_content(state, cfg);
        let title_size_px = base * ppi * state.text_scale;
        let title_height = block_height(
            title_size_px,
            title.lines.len(),
            typo.line_height,
            typo.glyph_box,
        );
        let date = date_content(state, cfg);
        let date_size_px = typo.base_details * ppi * state.text_scale;
        let gap_cm = if compact {
            typo.compact_date_gap_cm
        } else {
            typo.date_gap_cm
        };
        let date_gap_px = gap_cm * ppi;
        let height = match &date {
            Some(_) => title_height + date_gap_px + date_size_px * typo.glyph_box,
            None => title_height,
        };
        Self {
            title,
            title_size_px,
            title_height,
            date,
            date_size_px,
            date_gap_px,
            height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
