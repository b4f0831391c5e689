use super::*;

fn alpha_at(buf: &[u8], w: u32, x: u32, y: u32) -> u8 {
    buf[((y * w + x) * 4 + 3) as usize]
}

#[test]
fn slot_circle_uses_width_as_diameter() {
    let c = ClipRegion::slot(Point::new(50.0, 40.0), 20.0, 60.0, MaskShape::Circle);
    assert_eq!(c.bounds(), Rect::new(40.0, 30.0, 60.0, 50.0));
    assert!(c.contains(Point::new(50.0, 40.0)));
    assert!(!c.contains(Point::new(41.0, 31.0)));
}

#[test]
fn pixel_bounds_clamp_to_surface() {
    let b = PixelBounds::covering(Rect::new(-5.5, 2.2, 10.1, 30.0), 8, 20).unwrap();
    assert_eq!(b, PixelBounds { x: 0, y: 2, width: 8, height: 18 });
    assert!(PixelBounds::covering(Rect::new(20.0, 0.0, 30.0, 5.0), 8, 20).is_none());
}

#[test]
fn mask_is_rendered_in_absolute_coordinates() {
    let clip = ClipRegion::Rect(Rect::new(10.0, 10.0, 20.0, 20.0));
    let bounds = PixelBounds::covering(clip.bounds(), 64, 64).unwrap();
    let mask = MaskCompositor::new().render_mask(&clip, bounds).unwrap();
    assert_eq!(mask.len(), 10 * 10 * 4);
    assert!(mask.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn rotated_content_stays_inside_unrotated_clip() {
    let (w, h) = (64u32, 64u32);
    let mut dst = vec![0u8; (w * h * 4) as usize];
    let clip = ClipRegion::Rect(Rect::new(16.0, 16.0, 48.0, 48.0));
    // A large square rotated 45 degrees about the clip center.
    let content = Affine::translate(Vec2::new(32.0, 32.0))
        * Affine::rotate(std::f64::consts::FRAC_PI_4)
        * Affine::translate(Vec2::new(-40.0, -40.0));
    MaskCompositor::new()
        .composite_clipped(&mut dst, w, h, &clip, 1.0, |ctx, to_layer| {
            ctx.set_transform(affine_to_cpu(to_layer * content));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 0, 0, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 80.0, 80.0));
            Ok(())
        })
        .unwrap();

    let mut min = (w, h);
    let mut max = (0, 0);
    for y in 0..h {
        for x in 0..w {
            if alpha_at(&dst, w, x, y) > 0 {
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }
    }
    assert_eq!(min, (16, 16));
    assert_eq!(max, (47, 47));
    assert_eq!(alpha_at(&dst, w, 16, 16), 255);
    assert_eq!(alpha_at(&dst, w, 47, 47), 255);
}

#[test]
fn circle_clip_leaves_corners_empty() {
    let (w, h) = (40u32, 40u32);
    let mut dst = vec![0u8; (w * h * 4) as usize];
    let clip = ClipRegion::slot(Point::new(20.0, 20.0), 30.0, 30.0, MaskShape::Circle);
    MaskCompositor::new()
        .composite_clipped(&mut dst, w, h, &clip, 1.0, |ctx, to_layer| {
            ctx.set_transform(affine_to_cpu(to_layer));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 255, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 40.0, 40.0));
            Ok(())
        })
        .unwrap();
    assert_eq!(alpha_at(&dst, w, 20, 20), 255);
    assert_eq!(alpha_at(&dst, w, 6, 6), 0);
    assert_eq!(alpha_at(&dst, w, 33, 33), 0);
}
