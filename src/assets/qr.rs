use qrcode::{EcLevel, QrCode};

use crate::foundation::core::{BezPath, Rect};
use crate::foundation::error::{CoverError, CoverResult};

/// Module grid of an encoded QR code, without quiet zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `data` at error-correction level H.
    pub fn encode(data: &str) -> CoverResult<Self> {
        if data.is_empty() {
            return Err(CoverError::validation("qr data must be non-empty"));
        }
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
            .map_err(|e| CoverError::validation(format!("encode qr code: {e}")))?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` is dark. Out-of-range modules are light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Dark modules as one path of squares filling `bounds`.
    ///
    /// Horizontal runs are merged into single rectangles.
    pub fn to_path(&self, bounds: Rect) -> BezPath {
        let mut path = BezPath::new();
        if self.width == 0 {
            return path;
        }
        let cell_w = bounds.width() / self.width as f64;
        let cell_h = bounds.height() / self.width as f64;
        for y in 0..self.width {
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                let r = Rect::new(
                    bounds.x0 + start as f64 * cell_w,
                    bounds.y0 + y as f64 * cell_h,
                    bounds.x0 + x as f64 * cell_w,
                    bounds.y0 + (y + 1) as f64 * cell_h,
                );
                path.move_to((r.x0, r.y0));
                path.line_to((r.x1, r.y0));
                path.line_to((r.x1, r.y1));
                path.line_to((r.x0, r.y1));
                path.close_path();
            }
        }
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/qr.rs"]
mod tests;
