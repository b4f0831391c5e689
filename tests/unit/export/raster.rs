use super::*;

#[test]
fn pixel_size_follows_physical_width() {
    let cfg = EngineConfig::default();
    // 30 + 1.5 + 30 cm at 300 dpi.
    let (w, h) = export_pixel_size(&cfg, 30.0, 300.0);
    assert_eq!(w, (61.5_f64 * 300.0 / 2.54).round() as u32);
    assert_eq!(h, (30.0_f64 * 300.0 / 2.54).round() as u32);

    let frame = export_frame(&cfg, 30.0, 300.0).unwrap();
    assert_eq!(frame.pixel_size(), (w, h));
}

#[test]
fn multiplier_maps_preview_to_dpi() {
    let cfg = EngineConfig::default();
    let m = export_multiplier(&cfg, 254.0, 20.0).unwrap();
    assert!((m - 5.0).abs() < 1e-12);
    assert!(export_multiplier(&cfg, 0.0, 20.0).is_err());
    assert!(export_multiplier(&cfg, 300.0, f64::NAN).is_err());
}

#[test]
fn export_frame_rejects_bad_input() {
    let cfg = EngineConfig::default();
    assert!(export_frame(&cfg, 0.0, 300.0).is_err());
    assert!(export_frame(&cfg, 20.0, -1.0).is_err());
}

#[test]
fn encode_and_name() {
    let frame = FrameRGBA {
        width: 3,
        height: 2,
        data: vec![255; 3 * 2 * 4],
        premultiplied: true,
    };
    let png = ExportedRaster::encode(&frame, ExportFormat::Png).unwrap();
    assert_eq!((png.width, png.height), (3, 2));
    assert_eq!(png.file_name(30.0), "cover_30.png");
    assert!(!png.to_base64().is_empty());

    let jpg = ExportedRaster::encode(&frame, ExportFormat::Jpeg { quality: 90 }).unwrap();
    assert_eq!(jpg.format.mime(), "image/jpeg");
    assert_eq!(jpg.file_name(20.0), "cover_20.jpg");
}
