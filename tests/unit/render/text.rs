use super::*;

#[test]
fn invalid_size_is_rejected() {
    let mut engine = TextLayoutEngine::new();
    let bytes = Vec::new();
    assert!(
        engine
            .layout_line("x", "f.ttf", &bytes, 0.0, 0.0, TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn garbage_font_bytes_are_an_asset_error() {
    let mut engine = TextLayoutEngine::new();
    let bytes = b"not a font".to_vec();
    let err = engine
        .layout_line("x", "f.ttf", &bytes, 12.0, 0.0, TextBrushRgba8::default())
        .err()
        .unwrap();
    assert!(matches!(err, CoverError::Asset(_)));
}

#[test]
fn brush_from_color() {
    let b = TextBrushRgba8::from(crate::foundation::core::Rgba8::new(1, 2, 3, 4));
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}
