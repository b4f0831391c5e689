use super::*;

#[test]
fn parse_hex_accepts_short_long_and_alpha_forms() {
    assert_eq!(Rgba8::parse_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::parse_hex("#1a1a1a").unwrap(),
        Rgba8::rgb(0x1a, 0x1a, 0x1a)
    );
    assert_eq!(
        Rgba8::parse_hex("00000026").unwrap(),
        Rgba8::new(0, 0, 0, 0x26)
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn display_round_trips_through_serde_string() {
    let c = Rgba8::parse_hex("#962F2F").unwrap();
    assert_eq!(c.to_string(), "#962f2f");
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "\"#962f2f\"");
    let back: Rgba8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn premul_scales_channels_by_alpha() {
    assert_eq!(Rgba8::WHITE.premul(), [255, 255, 255, 255]);
    assert_eq!(Rgba8::new(255, 0, 100, 0).premul(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::new(255, 255, 255, 128).premul(), [128, 128, 128, 128]);
}

#[test]
fn with_opacity_multiplies_alpha() {
    assert_eq!(Rgba8::BLACK.with_opacity(0.3).a, 77);
    assert_eq!(Rgba8::BLACK.with_opacity(2.0).a, 255);
}

#[test]
fn origin_y_top_of() {
    assert_eq!(OriginY::Top.top_of(10.0, 4.0), 10.0);
    assert_eq!(OriginY::Center.top_of(10.0, 4.0), 8.0);
    assert_eq!(OriginY::Bottom.top_of(10.0, 4.0), 6.0);
}
