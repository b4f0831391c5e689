use crate::foundation::error::{CoverError, CoverResult};

/// Immutable record of one crop session, expressed in the square reference frame.
///
/// `offset_x`/`offset_y` locate the image center relative to the frame center, `scale` is the
/// image scale inside the frame and `window_width` is the mask window width the framing was
/// captured against. None of it depends on the resolution the crop is later rendered at.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropTransform {
    /// Image center x minus frame center x.
    pub offset_x: f64,
    /// Image center y minus frame center y.
    pub offset_y: f64,
    /// Uniform image scale in the reference frame.
    pub scale: f64,
    /// Clockwise rotation in degrees (a multiple of 90).
    pub angle_degrees: f64,
    /// Side length of the reference frame.
    pub frame_size: f64,
    /// Width of the mask window inside the frame.
    pub window_width: f64,
}

impl CropTransform {
    /// Reject transforms that cannot be projected.
    pub fn validate(&self) -> CoverResult<()> {
        let finite = [
            self.offset_x,
            self.offset_y,
            self.scale,
            self.angle_degrees,
            self.frame_size,
            self.window_width,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(CoverError::validation("crop transform values must be finite"));
        }
        if self.scale <= 0.0 || self.frame_size <= 0.0 || self.window_width <= 0.0 {
            return Err(CoverError::validation(
                "crop scale, frame size and window width must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/crop/transform.rs"]
mod tests;
