use super::*;

fn crop(angle: f64) -> CropTransform {
    CropTransform {
        offset_x: 30.0,
        offset_y: -20.0,
        scale: 0.25,
        angle_degrees: angle,
        frame_size: 500.0,
        window_width: 400.0,
    }
}

#[test]
fn offsets_and_scale_follow_window_ratio() {
    let p = project(&crop(0.0), Point::new(1000.0, 600.0), 800.0);
    assert_eq!(p.center, Point::new(1060.0, 560.0));
    assert_eq!(p.scale, 0.5);
    assert_eq!(p.angle_degrees, 0.0);
}

#[test]
fn rotation_is_resolution_independent() {
    let small = project(&crop(270.0), Point::new(0.0, 0.0), 200.0);
    let large = project(&crop(270.0), Point::new(0.0, 0.0), 3000.0);
    assert_eq!(small.angle_degrees, 270.0);
    assert_eq!(large.angle_degrees, 270.0);
}

#[test]
fn normalized_framing_is_identical_across_sizes() {
    let (iw, ih) = (4000.0, 3000.0);
    let t = crop(90.0);
    let mut samples = Vec::new();
    for w in [400.0, 709.0, 3000.0] {
        let center = Point::new(w, w);
        let p = project(&t, center, w);
        // Window corners and center, normalized by the window width.
        let pts = [(-0.5, -0.5), (0.5, -0.5), (0.0, 0.0), (0.5, 0.5)].map(|(u, v)| {
            let q = p
                .source_point(iw, ih, Point::new(center.x + u * w, center.y + v * w))
                .unwrap();
            (q.x, q.y)
        });
        samples.push(pts);
    }
    for pts in &samples[1..] {
        for (a, b) in pts.iter().zip(samples[0].iter()) {
            assert!((a.0 - b.0).abs() < 1e-6, "{a:?} vs {b:?}");
            assert!((a.1 - b.1).abs() < 1e-6, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn image_affine_maps_image_center_to_projected_center() {
    let p = project(&crop(180.0), Point::new(250.0, 250.0), 400.0);
    let c = p.image_affine(800.0, 600.0) * Point::new(400.0, 300.0);
    assert!((c.x - p.center.x).abs() < 1e-9);
    assert!((c.y - p.center.y).abs() < 1e-9);
}
