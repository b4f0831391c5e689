use crate::export::raster::ExportedRaster;
use crate::foundation::error::{CoverError, CoverResult};

const DEFAULT_ORDER_ID: &str = "no number";
const DEFAULT_CLIENT: &str = "not specified";

/// Who ordered the cover, as passed in by the storefront.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderMetadata {
    /// Order number.
    pub order_id: String,
    /// Client name.
    pub client_name: String,
    /// Client phone.
    pub client_phone: String,
}

impl Default for OrderMetadata {
    fn default() -> Self {
        Self {
            order_id: DEFAULT_ORDER_ID.to_string(),
            client_name: DEFAULT_CLIENT.to_string(),
            client_phone: DEFAULT_CLIENT.to_string(),
        }
    }
}

impl OrderMetadata {
    /// Build from optional query values; missing or blank values take their defaults.
    pub fn from_optional(
        order_id: Option<&str>,
        client_name: Option<&str>,
        client_phone: Option<&str>,
    ) -> Self {
        fn pick(v: Option<&str>, default: &str) -> String {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        }
        Self {
            order_id: pick(order_id, DEFAULT_ORDER_ID),
            client_name: pick(client_name, DEFAULT_CLIENT),
            client_phone: pick(client_phone, DEFAULT_CLIENT),
        }
    }

    /// HTML caption sent along with the image. Values are escaped.
    pub fn caption_html(&self) -> String {
        format!(
            "<b>NEW ORDER #{}</b>\n\n<b>Name:</b> {}\n<b>Phone:</b> {}\n\n<i>Design attached.</i>",
            escape_html(&self.order_id),
            escape_html(&self.client_name),
            escape_html(&self.client_phone),
        )
    }
}

/// One finished cover on its way to the relay.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderDelivery {
    /// Base64 of the encoded raster, without a `data:` prefix.
    pub raster_base64: String,
    /// MIME type of the raster.
    pub mime: String,
    /// Order details.
    pub order: OrderMetadata,
}

impl OrderDelivery {
    /// Package an exported raster.
    pub fn new(raster: &ExportedRaster, order: OrderMetadata) -> Self {
        Self {
            raster_base64: raster.to_base64(),
            mime: raster.format.mime().to_string(),
            order,
        }
    }

    /// Request body in the relay's JSON shape.
    pub fn to_json(&self) -> CoverResult<String> {
        let body = serde_json::json!({
            "imageBase64": self.raster_base64,
            "orderId": self.order.order_id,
            "clientName": self.order.client_name,
            "clientPhone": self.order.client_phone,
        });
        serde_json::to_string(&body)
            .map_err(|e| CoverError::serde(format!("serialize delivery: {e}")))
    }
}

/// External endpoint that forwards finished covers.
///
/// Implementations perform a single attempt; nothing is retried or queued.
pub trait NotificationRelay {
    /// Send one delivery. The error string is the relay's own reason.
    fn send(&mut self, delivery: &OrderDelivery) -> Result<(), String>;
}

/// Send `delivery` once and turn the outcome into the message shown to the user.
///
/// On failure the returned [`CoverError::Delivery`] carries the alert text.
#[tracing::instrument(skip(relay, delivery), fields(order = %delivery.order.order_id))]
pub fn submit_order(
    relay: &mut dyn NotificationRelay,
    delivery: &OrderDelivery,
) -> CoverResult<String> {
    match relay.send(delivery) {
        Ok(()) => {
            tracing::info!("order delivered");
            Ok(format!(
                "Order #{} sent successfully!",
                delivery.order.order_id
            ))
        }
        Err(reason) => {
            tracing::warn!(%reason, "order delivery failed");
            let reason = if reason.trim().is_empty() {
                "unknown error".to_string()
            } else {
                reason
            };
            Err(CoverError::delivery(format!("Sending failed: {reason}")))
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/relay/order.rs"]
mod tests;
