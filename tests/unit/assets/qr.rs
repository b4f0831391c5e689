use super::*;

#[test]
fn encode_produces_square_matrix_with_finders() {
    let m = QrMatrix::encode("https://example.com/order/42").unwrap();
    assert!(m.width() >= 21);
    assert_eq!((m.width() - 17) % 4, 0);
    // Finder patterns: dark corners top-left, top-right and bottom-left.
    assert!(m.is_dark(0, 0));
    assert!(m.is_dark(m.width() - 1, 0));
    assert!(m.is_dark(0, m.width() - 1));
    assert!(!m.is_dark(m.width(), 0));
}

#[test]
fn empty_data_is_rejected() {
    assert!(QrMatrix::encode("").is_err());
}

#[test]
fn path_stays_inside_bounds() {
    let m = QrMatrix::encode("hello").unwrap();
    let bounds = Rect::new(10.0, 20.0, 110.0, 120.0);
    let path = m.to_path(bounds);
    let bb = kurbo::Shape::bounding_box(&path);
    assert!(bb.x0 >= bounds.x0 - 1e-9 && bb.y0 >= bounds.y0 - 1e-9);
    assert!(bb.x1 <= bounds.x1 + 1e-9 && bb.y1 <= bounds.y1 + 1e-9);
    assert!((bb.x0 - bounds.x0).abs() < 1e-9);
    assert!((bb.y0 - bounds.y0).abs() < 1e-9);
}
