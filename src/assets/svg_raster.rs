use crate::foundation::core::Affine;
use crate::foundation::error::{CoverError, CoverResult};

const MAX_DIM: u32 = 16_384;

/// Raster size for drawing `tree` under `transform`, and the transform to draw that raster with.
///
/// Icons are scaled from their logical size to a few centimeters at print resolution, so the SVG
/// is rasterized at the drawn size instead of being upscaled.
pub fn svg_raster_params(tree: &usvg::Tree, transform: Affine) -> CoverResult<(u32, u32, Affine)> {
    fn to_px(v: f32) -> CoverResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(CoverError::asset("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let base_w = to_px(size.width())?;
    let base_h = to_px(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (f64::from(base_w) * sx).ceil().max(1.0) as u32;
    let h = (f64::from(base_h) * sy).ceil().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(CoverError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    // Pixel space of the raster maps back into the SVG's logical space before `transform`.
    let adjust = transform
        * Affine::scale_non_uniform(
            f64::from(size.width()) / f64::from(w),
            f64::from(size.height()) / f64::from(h),
        );
    Ok((w, h, adjust))
}

/// Rasterize `tree` stretched to `width`x`height` into premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> CoverResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CoverError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
