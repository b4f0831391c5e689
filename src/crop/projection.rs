use crate::crop::transform::CropTransform;
use crate::foundation::core::{Affine, Point, Vec2};

/// A crop transform resolved against a concrete target window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPlacement {
    /// Image center in output pixels.
    pub center: Point,
    /// Image scale in output pixels per source pixel.
    pub scale: f64,
    /// Clockwise rotation in degrees.
    pub angle_degrees: f64,
}

impl ProjectedPlacement {
    /// Map source-image pixels (origin top-left) to output pixels: the image is centered on
    /// its own midpoint, scaled, rotated, then moved to `center`.
    pub fn image_affine(&self, image_w: f64, image_h: f64) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.angle_degrees.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate(Vec2::new(-image_w / 2.0, -image_h / 2.0))
    }

    /// Source-image point shown at output point `p`, if the placement is invertible.
    pub fn source_point(&self, image_w: f64, image_h: f64, p: Point) -> Option<Point> {
        let a = self.image_affine(image_w, image_h);
        if a.determinant().abs() <= f64::EPSILON {
            return None;
        }
        Some(a.inverse() * p)
    }
}

/// Re-project a captured crop onto a window `target_window_width` pixels wide centered at
/// `target_center`.
///
/// Everything captured in the reference frame (offset and scale) is multiplied by the same
/// factor, so the framing is identical at any output resolution. Rotation is unchanged.
pub fn project(
    transform: &CropTransform,
    target_center: Point,
    target_window_width: f64,
) -> ProjectedPlacement {
    let factor = target_window_width / transform.window_width;
    ProjectedPlacement {
        center: Point::new(
            target_center.x + transform.offset_x * factor,
            target_center.y + transform.offset_y * factor,
        ),
        scale: transform.scale * factor,
        angle_degrees: transform.angle_degrees,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/crop/projection.rs"]
mod tests;
