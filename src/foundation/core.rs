use std::fmt;

use crate::foundation::error::{CoverError, CoverResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Straight-alpha RGBA8 color, authored in design files as `#rrggbb` or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight, not premultiplied).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Build a color from straight-alpha channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> CoverResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let digit = |i: usize| -> CoverResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| CoverError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, ch) in hex.chars().enumerate() {
                    let v = ch
                        .to_digit(16)
                        .ok_or_else(|| CoverError::validation(format!("invalid hex color '{s}'")))?
                        as u8;
                    out[i] = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 if hex.is_ascii() => Ok(Self::rgb(digit(0)?, digit(2)?, digit(4)?)),
            8 if hex.is_ascii() => Ok(Self::new(digit(0)?, digit(2)?, digit(4)?, digit(6)?)),
            _ => Err(CoverError::validation(format!("invalid hex color '{s}'"))),
        }
    }

    /// Multiply alpha by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (f32::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = CoverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_string()
    }
}

/// Horizontal anchor of a placed element relative to its anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginX {
    /// The anchor is the element's left (start) edge.
    Left,
    /// The anchor is the element's horizontal center.
    Center,
}

/// Vertical anchor of a placed element relative to its anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginY {
    /// The anchor is the element's top edge.
    Top,
    /// The anchor is the element's vertical center.
    Center,
    /// The anchor is the element's bottom edge.
    Bottom,
}

impl OriginY {
    /// Top edge of a box of `height` anchored at `y`.
    pub fn top_of(self, y: f64, height: f64) -> f64 {
        match self {
            Self::Top => y,
            Self::Center => y - height / 2.0,
            Self::Bottom => y - height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
