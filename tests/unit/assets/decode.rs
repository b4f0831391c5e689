use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_png_premultiplies() {
    let img = decode_image(&png_bytes(3, 2, [200, 100, 0, 128])).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
    assert_eq!(img.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(&img.rgba8_premul[..4], &[100, 50, 0, 128]);
}

#[test]
fn decode_garbage_is_error() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn svg_sniffing() {
    assert!(looks_like_svg(b"<svg xmlns='http://www.w3.org/2000/svg'/>"));
    assert!(looks_like_svg(
        b"<?xml version=\"1.0\"?>\n<svg xmlns='http://www.w3.org/2000/svg'/>"
    ));
    assert!(looks_like_svg(b"\n  <svg/>"));
    assert!(!looks_like_svg(&png_bytes(1, 1, [0, 0, 0, 255])));
    assert!(!looks_like_svg(b""));
}

#[test]
fn parse_svg_reads_size() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="red"/></svg>"#;
    let tree = parse_svg(svg).unwrap();
    assert_eq!(tree.size().width(), 40.0);
    assert_eq!(tree.size().height(), 20.0);
    assert!(parse_svg(b"<svg").is_err());
}
