use super::*;
use crate::design::state::DesignState;

fn square_rect() -> CropRequest {
    CropRequest {
        slot: SlotSize::SQUARE_6,
        mask: MaskShape::Rect,
    }
}

fn session(w: u32, h: u32, request: CropRequest) -> CropSession {
    CropSession::start(w, h, request, &CropConfig::default()).unwrap()
}

#[test]
fn start_uses_cover_scale_and_centers() {
    let s = session(4000, 3000, square_rect());
    let range = s.zoom_range();
    assert!((s.scale() - 400.0 / 3000.0).abs() < 1e-12);
    assert_eq!(range.min, s.scale());
    assert!((range.max - 4.0 * range.min).abs() < 1e-12);
    assert!((range.step - 0.01 * range.min).abs() < 1e-12);
    assert_eq!(s.center(), Point::new(250.0, 250.0));
    assert!(s.covers_window(1e-9));
}

#[test]
fn window_preserves_slot_aspect() {
    let wide = CropWindow::fit(SlotSize { w: 8.0, h: 4.0 }, MaskShape::Rect, 400.0);
    assert_eq!((wide.width, wide.height), (400.0, 200.0));
    let tall = CropWindow::fit(SlotSize { w: 4.0, h: 8.0 }, MaskShape::Rect, 400.0);
    assert_eq!((tall.width, tall.height), (200.0, 400.0));
    let circle = CropWindow::fit(SlotSize { w: 4.0, h: 8.0 }, MaskShape::Circle, 400.0);
    assert_eq!((circle.width, circle.height), (400.0, 400.0));
}

#[test]
fn zero_sized_image_is_rejected() {
    assert!(CropSession::start(0, 10, square_rect(), &CropConfig::default()).is_err());
}

#[test]
fn zoom_is_clamped_into_range() {
    let mut s = session(1000, 1000, square_rect());
    let range = s.zoom_range();
    s.set_zoom(0.0);
    assert_eq!(s.scale(), range.min);
    s.set_zoom(100.0);
    assert_eq!(s.scale(), range.max);
    s.set_zoom(f64::NAN);
    assert_eq!(s.scale(), range.min);
}

#[test]
fn drag_cannot_expose_window_edges() {
    let mut s = session(4000, 3000, square_rect());
    s.set_zoom(s.zoom_range().min * 2.0);
    s.drag_by(10_000.0, -10_000.0);
    assert!(s.covers_window(1e-9));
    let (dw, dh) = s.displayed_size();
    let win = s.window_bounds();
    assert!((s.center().x - (win.x0 + dw / 2.0)).abs() < 1e-9);
    assert!((s.center().y - (win.y1 - dh / 2.0)).abs() < 1e-9);
}

#[test]
fn cover_guarantee_holds_across_zoom_range() {
    let mut s = session(4000, 3000, square_rect());
    let range = s.zoom_range();
    let mut z = range.min;
    while z <= range.max {
        s.set_zoom(z);
        for (dx, dy) in [(-900.0, 0.0), (900.0, 900.0), (0.0, -900.0)] {
            s.drag_by(dx, dy);
            assert!(s.covers_window(1e-6), "zoom {z} drag {dx},{dy}");
        }
        z += range.step * 17.0;
    }
}

#[test]
fn four_rotations_restore_effective_size_and_cover_scale() {
    let mut s = session(4000, 3000, CropRequest {
        slot: SlotSize { w: 8.0, h: 4.0 },
        mask: MaskShape::Rect,
    });
    let size0 = s.effective_size();
    let min0 = s.cover_scale();
    s.rotate();
    assert_eq!(s.effective_size(), (3000.0, 4000.0));
    assert!(s.covers_window(1e-9));
    s.rotate();
    s.rotate();
    s.rotate();
    assert_eq!(s.turn(), QuarterTurn::R0);
    assert_eq!(s.effective_size(), size0);
    assert_eq!(s.cover_scale(), min0);
}

#[test]
fn rotation_keeps_zoom_above_new_floor() {
    let mut s = session(4000, 3000, square_rect());
    let zoomed = s.zoom_range().min * 3.0;
    s.set_zoom(zoomed);
    s.rotate();
    assert_eq!(s.scale(), zoomed);
    assert!(s.covers_window(1e-9));
}

#[test]
fn rotation_raises_scale_when_below_new_floor() {
    let mut s = session(4000, 2000, CropRequest {
        slot: SlotSize { w: 8.0, h: 4.0 },
        mask: MaskShape::Rect,
    });
    let before = s.scale();
    s.rotate();
    assert!(s.scale() > before);
    assert_eq!(s.scale(), s.cover_scale());
}

#[test]
fn apply_records_offsets_relative_to_frame_center() {
    let mut s = session(4000, 3000, square_rect());
    s.set_zoom(s.zoom_range().min * 2.0);
    s.drag_by(-40.0, 25.0);
    s.rotate();
    let t = s.apply();
    assert_eq!(t.offset_x, s.center().x - 250.0);
    assert_eq!(t.offset_y, s.center().y - 250.0);
    assert_eq!(t.scale, s.scale());
    assert_eq!(t.angle_degrees, 90.0);
    assert_eq!(t.frame_size, 500.0);
    assert_eq!(t.window_width, 400.0);
}

#[test]
fn set_mask_refits_window_and_recovers() {
    let mut s = session(4000, 3000, square_rect());
    s.set_mask(SlotSize { w: 4.0, h: 8.0 }, MaskShape::Rect);
    assert_eq!(s.window().width, 200.0);
    assert!(s.covers_window(1e-9));
}

#[test]
fn request_follows_layout() {
    let mut state = DesignState::default();
    assert_eq!(CropRequest::for_design(&state), None);
    state.set_layout(LayoutVariant::Magazine);
    let r = CropRequest::for_design(&state).unwrap();
    assert_eq!(r.slot, SlotSize { w: 1.0, h: 1.0 });
    state.set_layout(LayoutVariant::PhotoText);
    state.set_crop_mask(crate::design::state::MaskPreset::Circle);
    let r = CropRequest::for_design(&state).unwrap();
    assert_eq!(r.mask, MaskShape::Circle);
    state.set_layout(LayoutVariant::Graphic);
    assert_eq!(CropRequest::for_design(&state), None);
}

#[test]
fn request_exists_exactly_for_cropping_layouts() {
    let mut state = DesignState::default();
    for layout in LayoutVariant::ALL {
        state.set_layout(layout);
        assert_eq!(
            CropRequest::for_design(&state).is_some(),
            layout.crops_main_image(),
            "{}",
            layout.as_str()
        );
    }
}
