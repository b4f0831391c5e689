use super::*;

fn cfg() -> EngineConfig {
    EngineConfig::default()
}

#[test]
fn desktop_pins_scale_to_reference_size() {
    let cfg = cfg();
    let r = GeometryResolver::new(&cfg);
    let area = DisplayArea::desktop(1280.0, 800.0);
    let big = r.resolve(&area, 30.0).unwrap();
    let small = r.resolve(&area, 15.0).unwrap();
    let expected = ((1280.0 - 40.0) / 61.5f64).min((800.0 - 40.0) / 30.0);
    assert!((big.base_ppi - expected).abs() < 1e-9);
    assert_eq!(big.ppi, small.ppi);
    assert!((big.ppi - expected * 3.0).abs() < 1e-9);
    assert!(small.width_px < big.width_px);
}

#[test]
fn desktop_floor_applies_to_tiny_containers() {
    let cfg = cfg();
    let f = GeometryResolver::new(&cfg)
        .resolve(&DisplayArea::desktop(60.0, 60.0), 30.0)
        .unwrap();
    assert_eq!(f.base_ppi, 5.0);
}

#[test]
fn mobile_fits_current_book() {
    let cfg = cfg();
    let f = GeometryResolver::new(&cfg)
        .resolve(&DisplayArea::mobile(400.0, 700.0), 20.0)
        .unwrap();
    let expected = (360.0 / 41.5f64).min(660.0 / 20.0);
    assert!((f.base_ppi - expected).abs() < 1e-9);
    let (dw, _) = f.display_size();
    assert!((dw - 360.0).abs() < 1e-9);
}

#[test]
fn degenerate_area_skips_render() {
    let cfg = cfg();
    let r = GeometryResolver::new(&cfg);
    assert!(r.resolve(&DisplayArea::desktop(0.0, 500.0), 30.0).is_none());
    assert!(r.resolve(&DisplayArea::mobile(30.0, 30.0), 30.0).is_none());
    assert!(r.resolve(&DisplayArea::desktop(800.0, f64::NAN), 30.0).is_none());
    assert!(r.resolve(&DisplayArea::desktop(800.0, 600.0), 0.0).is_none());
}

#[test]
fn panel_lines_and_centers() {
    let f = GeometryFrame::from_ppi(20.0, 1.5, 10.0, 10.0);
    assert_eq!(f.back_spine_x, 200.0);
    assert_eq!(f.spine_front_x, 215.0);
    assert_eq!(f.spine_center_x, 207.5);
    assert_eq!(f.front_center_x, 315.0);
    assert_eq!(f.back_center_x, 100.0);
    assert_eq!(f.center_y, 100.0);
    assert_eq!(f.width_px, 415.0);
    assert_eq!(f.front_panel(), Rect::new(215.0, 0.0, 415.0, 200.0));
    assert_eq!(f.spine_panel().width(), 15.0);
}

#[test]
fn dpi_geometry_matches_print_size() {
    let cfg = cfg();
    let f = GeometryResolver::new(&cfg).for_dpi(30.0, 300.0);
    assert_eq!(f.pixel_size().0, (61.5f64 * 300.0 / 2.54).round() as u32);
}

#[test]
fn scaled_multiplies_every_coordinate() {
    let f = GeometryFrame::from_ppi(20.0, 1.5, 10.0, 10.0);
    let g = f.scaled(2.5);
    assert_eq!(g.ppi, 25.0);
    assert_eq!(g.front_center_x, f.front_center_x * 2.5);
    assert_eq!(g.base_ppi, f.base_ppi);
}
