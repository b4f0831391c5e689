use base64::Engine;

use super::*;
use crate::export::raster::ExportFormat;

struct Recorder {
    sent: Vec<OrderDelivery>,
    fail_with: Option<String>,
}

impl NotificationRelay for Recorder {
    fn send(&mut self, delivery: &OrderDelivery) -> Result<(), String> {
        self.sent.push(delivery.clone());
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

fn raster() -> ExportedRaster {
    ExportedRaster {
        width: 1,
        height: 1,
        format: ExportFormat::Jpeg { quality: 90 },
        bytes: vec![1, 2, 3],
    }
}

#[test]
fn metadata_defaults_fill_blanks() {
    let m = OrderMetadata::from_optional(Some("42"), Some("  "), None);
    assert_eq!(m.order_id, "42");
    assert_eq!(m.client_name, "not specified");
    assert_eq!(m.client_phone, "not specified");
    assert_eq!(OrderMetadata::default().order_id, "no number");
}

#[test]
fn caption_escapes_values() {
    let m = OrderMetadata::from_optional(Some("7"), Some("<Ann & Bo>"), Some("+1"));
    let c = m.caption_html();
    assert!(c.contains("<b>NEW ORDER #7</b>"));
    assert!(c.contains("&lt;Ann &amp; Bo&gt;"));
    assert!(!c.contains("<Ann"));
}

#[test]
fn delivery_carries_base64_raster() {
    let d = OrderDelivery::new(&raster(), OrderMetadata::default());
    assert_eq!(d.mime, "image/jpeg");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&d.raster_base64)
        .unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
    let json: serde_json::Value = serde_json::from_str(&d.to_json().unwrap()).unwrap();
    assert_eq!(json["orderId"], "no number");
    assert_eq!(json["imageBase64"], d.raster_base64.as_str());
}

#[test]
fn submit_is_fire_once() {
    let d = OrderDelivery::new(&raster(), OrderMetadata::from_optional(Some("9"), None, None));
    let mut ok = Recorder {
        sent: vec![],
        fail_with: None,
    };
    assert_eq!(
        submit_order(&mut ok, &d).unwrap(),
        "Order #9 sent successfully!"
    );
    assert_eq!(ok.sent.len(), 1);

    let mut bad = Recorder {
        sent: vec![],
        fail_with: Some("chat not found".to_string()),
    };
    let err = submit_order(&mut bad, &d).unwrap_err();
    assert_eq!(bad.sent.len(), 1);
    match err {
        CoverError::Delivery(msg) => assert_eq!(msg, "Sending failed: chat not found"),
        other => panic!("unexpected error: {other}"),
    }
}
