use super::*;

fn base() -> CropTransform {
    CropTransform {
        offset_x: -12.0,
        offset_y: 4.0,
        scale: 0.13,
        angle_degrees: 90.0,
        frame_size: 500.0,
        window_width: 400.0,
    }
}

#[test]
fn valid_transform_passes() {
    assert!(base().validate().is_ok());
}

#[test]
fn zero_window_is_rejected() {
    let t = CropTransform {
        window_width: 0.0,
        ..base()
    };
    assert!(t.validate().is_err());
}

#[test]
fn non_finite_offset_is_rejected() {
    let t = CropTransform {
        offset_x: f64::NAN,
        ..base()
    };
    assert!(t.validate().is_err());
}

#[test]
fn serde_field_names_are_stable() {
    let v = serde_json::to_value(base()).unwrap();
    assert_eq!(v["offset_x"], -12.0);
    assert_eq!(v["window_width"], 400.0);
    let back: CropTransform = serde_json::from_value(v).unwrap();
    assert_eq!(back, base());
}
