use kurbo::Shape;

use crate::compose::pixel::{
    mask_apply_alpha_rgba8_premul, opacity_rgba8_premul_in_place, premul_over_at,
};
use crate::design::state::MaskShape;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::error::{CoverError, CoverResult};
use crate::render::cpu::{affine_to_cpu, bezpath_to_cpu};

/// Clip shape in absolute surface coordinates.
///
/// A clip never inherits the transform of the content it clips: rotating or scaling an image
/// leaves its clip untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipRegion {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
    },
}

impl ClipRegion {
    /// Slot window of `width`x`height` centered at `center`. Circles use `width` as diameter.
    pub fn slot(center: Point, width: f64, height: f64, shape: MaskShape) -> Self {
        match shape {
            MaskShape::Rect => Self::Rect(Rect::from_center_size(center, (width, height))),
            MaskShape::Circle => Self::Circle {
                center,
                radius: width / 2.0,
            },
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect(r) => r,
            Self::Circle { center, radius } => {
                Rect::from_center_size(center, (radius * 2.0, radius * 2.0))
            }
        }
    }

    /// Whether `p` lies inside the region.
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Self::Rect(r) => r.contains(p),
            Self::Circle { center, radius } => (p - center).hypot() <= radius,
        }
    }

    /// Outline path.
    pub fn to_path(&self) -> BezPath {
        match *self {
            Self::Rect(r) => r.to_path(0.1),
            Self::Circle { center, radius } => kurbo::Circle::new(center, radius).to_path(0.1),
        }
    }
}

/// How a clipped image is composed into its panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeMode {
    /// Placed, then clipped to the slot window.
    Slot,
    /// Scaled to cover the panel, clipped to it and sent behind every other node.
    FullBleed,
}

/// Integer pixel rectangle inside a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelBounds {
    /// Pixels touched by `rect` inside a `surface_w`x`surface_h` surface, or `None` when the
    /// rectangle misses the surface.
    pub fn covering(rect: Rect, surface_w: u32, surface_h: u32) -> Option<Self> {
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(f64::from(surface_w));
        let y1 = rect.y1.ceil().min(f64::from(surface_h));
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Transform from surface pixels to layer pixels.
    pub fn to_layer(&self) -> Affine {
        Affine::translate(Vec2::new(-f64::from(self.x), -f64::from(self.y)))
    }
}

/// Composites content through an absolute clip.
///
/// Content and mask are rasterized into two layers covering only the clip's pixel bounds. The
/// content layer uses the content's own transform; the mask layer uses nothing but the shift
/// into layer space. The mask's alpha then multiplies the content before it is composited.
#[derive(Debug, Default)]
pub struct MaskCompositor;

impl MaskCompositor {
    /// Build a compositor.
    pub fn new() -> Self {
        Self
    }

    /// Rasterize `clip` into a coverage layer over `bounds`.
    pub fn render_mask(&self, clip: &ClipRegion, bounds: PixelBounds) -> CoverResult<Vec<u8>> {
        let (w, h) = layer_dims(bounds)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(affine_to_cpu(bounds.to_layer()));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(&clip.to_path()));
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }

    /// Draw content with `draw` and composite it into `dst` through `clip`.
    ///
    /// `draw` receives a fresh context and the surface-to-layer transform it must prepend to
    /// its own transforms.
    pub fn composite_clipped(
        &self,
        dst: &mut [u8],
        dst_w: u32,
        dst_h: u32,
        clip: &ClipRegion,
        opacity: f32,
        draw: impl FnOnce(&mut vello_cpu::RenderContext, Affine) -> CoverResult<()>,
    ) -> CoverResult<()> {
        let Some(bounds) = PixelBounds::covering(clip.bounds(), dst_w, dst_h) else {
            tracing::debug!(?clip, "clip outside surface, nothing to draw");
            return Ok(());
        };
        let (w, h) = layer_dims(bounds)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        draw(&mut ctx, bounds.to_layer())?;
        ctx.flush();
        let mut content = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut content);

        let mask = self.render_mask(clip, bounds)?;
        let mut layer = vec![0u8; mask.len()];
        mask_apply_alpha_rgba8_premul(content.data_as_u8_slice(), &mask, &mut layer);
        opacity_rgba8_premul_in_place(&mut layer, opacity);

        premul_over_at(
            dst,
            dst_w,
            dst_h,
            &layer,
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y,
        )
    }
}

fn layer_dims(bounds: PixelBounds) -> CoverResult<(u16, u16)> {
    let w: u16 = bounds
        .width
        .try_into()
        .map_err(|_| CoverError::render("clip layer width exceeds u16"))?;
    let h: u16 = bounds
        .height
        .try_into()
        .map_err(|_| CoverError::render("clip layer height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/mask.rs"]
mod tests;
