use super::*;

#[test]
fn system_font_is_a_single_face() {
    let bytes = load_system_font().expect("an installed font");
    let tag = &bytes[..4];
    assert!(
        tag == [0, 1, 0, 0] || tag == b"OTTO" || tag == b"true",
        "unexpected sfnt tag {tag:?}"
    );
}
