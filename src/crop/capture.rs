use crate::config::CropConfig;
use crate::crop::transform::CropTransform;
use crate::design::state::{DesignState, LayoutVariant, MaskShape, SlotSize};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{CoverError, CoverResult};

/// Image rotation in quarter turns, clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuarterTurn {
    /// No rotation.
    #[default]
    R0,
    /// 90 degrees clockwise.
    R90,
    /// 180 degrees.
    R180,
    /// 270 degrees clockwise.
    R270,
}

impl QuarterTurn {
    /// Rotation in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            Self::R0 => 0.0,
            Self::R90 => 90.0,
            Self::R180 => 180.0,
            Self::R270 => 270.0,
        }
    }

    /// The next clockwise quarter turn.
    pub fn next(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }

    /// Whether width and height trade places.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }

    /// Width and height of a `w`x`h` image after the rotation.
    pub fn effective_size(self, w: f64, h: f64) -> (f64, f64) {
        if self.swaps_axes() { (h, w) } else { (w, h) }
    }
}

/// Slot and mask a crop session is started with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRequest {
    /// Physical slot size; only its aspect matters to the session.
    pub slot: SlotSize,
    /// Mask shape.
    pub mask: MaskShape,
}

impl CropRequest {
    /// The crop a new main-image upload goes through for the design's layout, or `None` when
    /// the layout places artwork uncropped.
    pub fn for_design(state: &DesignState) -> Option<Self> {
        if !state.layout.crops_main_image() {
            return None;
        }
        Some(match state.layout {
            LayoutVariant::Magazine => Self {
                slot: SlotSize { w: 1.0, h: 1.0 },
                mask: MaskShape::Rect,
            },
            _ => Self {
                slot: state.slot,
                mask: state.mask,
            },
        })
    }
}

/// Mask window centered in the reference frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropWindow {
    /// Window width in frame units.
    pub width: f64,
    /// Window height in frame units.
    pub height: f64,
    /// Window shape.
    pub shape: MaskShape,
}

impl CropWindow {
    /// Fit a slot's aspect into a square of side `window_max`. Circles are always square.
    pub fn fit(slot: SlotSize, shape: MaskShape, window_max: f64) -> Self {
        let (width, height) = match shape {
            MaskShape::Circle => (window_max, window_max),
            MaskShape::Rect => {
                let aspect = slot.aspect();
                if aspect >= 1.0 {
                    (window_max, window_max / aspect)
                } else {
                    (window_max * aspect, window_max)
                }
            }
        };
        Self {
            width,
            height,
            shape,
        }
    }

    /// Window bounds in a frame of side `frame_size`.
    pub fn bounds(&self, frame_size: f64) -> Rect {
        let c = frame_size / 2.0;
        Rect::new(
            c - self.width / 2.0,
            c - self.height / 2.0,
            c + self.width / 2.0,
            c + self.height / 2.0,
        )
    }
}

/// Allowed zoom range of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRange {
    /// Smallest scale that still covers the window.
    pub min: f64,
    /// Largest scale.
    pub max: f64,
    /// Slider step.
    pub step: f64,
}

/// Interactive pan/zoom/rotate framing of one image against a mask window.
///
/// All coordinates live in the square reference frame from [`CropConfig`]. The image is
/// positioned by its center. Every mutation re-establishes two invariants: the scale is at
/// least the cover scale for the current rotation, and the window never shows anything outside
/// the image. Out-of-range input is corrected in place.
#[derive(Clone, Debug)]
pub struct CropSession {
    image_w: f64,
    image_h: f64,
    frame_size: f64,
    window_max: f64,
    max_zoom_factor: f64,
    zoom_step_fraction: f64,
    window: CropWindow,
    turn: QuarterTurn,
    center: Point,
    scale: f64,
}

impl CropSession {
    /// Open a session at the cover scale, image centered.
    pub fn start(
        image_w: u32,
        image_h: u32,
        request: CropRequest,
        config: &CropConfig,
    ) -> CoverResult<Self> {
        if image_w == 0 || image_h == 0 {
            return Err(CoverError::validation("crop image must have non-zero size"));
        }
        if !(request.slot.w > 0.0 && request.slot.h > 0.0) {
            return Err(CoverError::validation("crop slot must have positive size"));
        }
        let window = CropWindow::fit(request.slot, request.mask, config.window_max);
        let c = config.frame_size / 2.0;
        let mut session = Self {
            image_w: f64::from(image_w),
            image_h: f64::from(image_h),
            frame_size: config.frame_size,
            window_max: config.window_max,
            max_zoom_factor: config.max_zoom_factor,
            zoom_step_fraction: config.zoom_step_fraction,
            window,
            turn: QuarterTurn::R0,
            center: Point::new(c, c),
            scale: 0.0,
        };
        session.scale = session.cover_scale();
        session.clamp_center();
        tracing::debug!(
            image_w,
            image_h,
            window_w = window.width,
            window_h = window.height,
            scale = session.scale,
            "crop session started"
        );
        Ok(session)
    }

    /// Image size after the current rotation.
    pub fn effective_size(&self) -> (f64, f64) {
        self.turn.effective_size(self.image_w, self.image_h)
    }

    /// Smallest scale at which the rotated image covers the window on both axes.
    pub fn cover_scale(&self) -> f64 {
        let (ew, eh) = self.effective_size();
        (self.window.width / ew).max(self.window.height / eh)
    }

    /// Zoom range for the current rotation.
    pub fn zoom_range(&self) -> ZoomRange {
        let min = self.cover_scale();
        ZoomRange {
            min,
            max: min * self.max_zoom_factor,
            step: min * self.zoom_step_fraction,
        }
    }

    /// Set the zoom, clamped into [`Self::zoom_range`], then re-clamp the position.
    pub fn set_zoom(&mut self, scale: f64) {
        let range = self.zoom_range();
        let s = if scale.is_finite() { scale } else { range.min };
        self.scale = s.max(range.min).min(range.max);
        self.clamp_center();
    }

    /// Move the image center to `center` (frame units), clamped.
    pub fn drag_to(&mut self, center: Point) {
        if center.x.is_finite() && center.y.is_finite() {
            self.center = center;
        }
        self.clamp_center();
    }

    /// Move the image by `(dx, dy)`, clamped.
    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        self.drag_to(Point::new(self.center.x + dx, self.center.y + dy));
    }

    /// Rotate a quarter turn clockwise. The zoom is kept but floored at the new cover scale
    /// (and capped at the new maximum); the position is re-clamped.
    pub fn rotate(&mut self) {
        self.turn = self.turn.next();
        let range = self.zoom_range();
        self.scale = self.scale.max(range.min).min(range.max);
        self.clamp_center();
        tracing::debug!(angle = self.turn.degrees(), scale = self.scale, "crop rotated");
    }

    /// Change the mask mid-session. The window is refitted and the image re-covered.
    pub fn set_mask(&mut self, slot: SlotSize, shape: MaskShape) {
        if !(slot.w > 0.0 && slot.h > 0.0) {
            return;
        }
        self.window = CropWindow::fit(slot, shape, self.window_max);
        let range = self.zoom_range();
        self.scale = self.scale.max(range.min).min(range.max);
        self.clamp_center();
    }

    /// Current mask window.
    pub fn window(&self) -> CropWindow {
        self.window
    }

    /// Mask window bounds in the frame.
    pub fn window_bounds(&self) -> Rect {
        self.window.bounds(self.frame_size)
    }

    /// Current rotation.
    pub fn turn(&self) -> QuarterTurn {
        self.turn
    }

    /// Current scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current image center in frame units.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Displayed (rotated, scaled) image size.
    pub fn displayed_size(&self) -> (f64, f64) {
        let (ew, eh) = self.effective_size();
        (ew * self.scale, eh * self.scale)
    }

    /// Displayed image bounds in the frame.
    pub fn displayed_bounds(&self) -> Rect {
        let (dw, dh) = self.displayed_size();
        Rect::new(
            self.center.x - dw / 2.0,
            self.center.y - dh / 2.0,
            self.center.x + dw / 2.0,
            self.center.y + dh / 2.0,
        )
    }

    /// Whether the displayed image contains the whole window (within `eps` frame units).
    pub fn covers_window(&self, eps: f64) -> bool {
        let img = self.displayed_bounds();
        let win = self.window_bounds();
        img.x0 <= win.x0 + eps
            && img.y0 <= win.y0 + eps
            && img.x1 >= win.x1 - eps
            && img.y1 >= win.y1 - eps
    }

    /// Freeze the session into a [`CropTransform`].
    pub fn apply(&self) -> CropTransform {
        let c = self.frame_size / 2.0;
        CropTransform {
            offset_x: self.center.x - c,
            offset_y: self.center.y - c,
            scale: self.scale,
            angle_degrees: self.turn.degrees(),
            frame_size: self.frame_size,
            window_width: self.window.width,
        }
    }

    fn clamp_center(&mut self) {
        let (dw, dh) = self.displayed_size();
        let win = self.window_bounds();
        let c = self.frame_size / 2.0;
        self.center.x = clamp_axis(self.center.x, dw, win.x0, win.x1, c);
        self.center.y = clamp_axis(self.center.y, dh, win.y0, win.y1, c);
    }
}

/// Keep a span of length `extent` centered at `pos` over `[lo, hi]`, or center it when it is
/// too small to cover the window.
fn clamp_axis(pos: f64, extent: f64, lo: f64, hi: f64, center: f64) -> f64 {
    if extent < hi - lo {
        return center;
    }
    let min = hi - extent / 2.0;
    let max = lo + extent / 2.0;
    pos.max(min).min(max)
}

#[cfg(test)]
#[path = "../../tests/unit/crop/capture.rs"]
mod tests;
