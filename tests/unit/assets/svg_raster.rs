use super::*;

fn tree(w: u32, h: u32) -> usvg::Tree {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><rect width="{w}" height="{h}" fill="blue"/></svg>"#
    );
    usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default()).unwrap()
}

#[test]
fn params_follow_transform_scale() {
    let t = tree(10, 20);
    let (w, h, adjust) = svg_raster_params(&t, Affine::scale(3.0)).unwrap();
    assert_eq!((w, h), (30, 60));
    // Raster pixel (30, 60) lands where logical (10, 20) would under the original transform.
    let p = adjust * kurbo::Point::new(30.0, 60.0);
    assert!((p.x - 30.0).abs() < 1e-9 && (p.y - 60.0).abs() < 1e-9);
}

#[test]
fn params_reject_huge_rasters() {
    let t = tree(100, 100);
    assert!(svg_raster_params(&t, Affine::scale(1000.0)).is_err());
}

#[test]
fn rasterize_fills_opaque() {
    let t = tree(4, 4);
    let px = rasterize_svg_to_premul_rgba8(&t, 8, 8).unwrap();
    assert_eq!(px.len(), 8 * 8 * 4);
    let center = (4 * 8 + 4) * 4;
    assert_eq!(&px[center..center + 4], &[0, 0, 255, 255]);
}
