//! # QR Capability
//!
//! The QR payload format and the encoder capability interface.
//!
//! Actual image generation lives outside the core and is injected as a
//! capability. The inventory store accepts an optional [`QrEncoder`];
//! when none is available, or encoding fails, items are saved without a
//! code rather than failing the whole add.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::InventoryItem;

/// Type tag embedded in every item QR payload so the camera scanner can
/// reject foreign codes.
pub const QR_ITEM_TYPE: &str = "LELCA_POS_ITEM";

/// The JSON payload encoded into an item's QR code.
///
/// Wire format (consumed by the camera-scan lookup):
/// `{"id": "...", "name": "...", "type": "LELCA_POS_ITEM"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QrPayload {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

impl QrPayload {
    /// Builds the payload for an inventory item.
    pub fn for_item(item: &InventoryItem) -> QrPayload {
        QrPayload {
            id: item.id.clone(),
            name: item.item_name.clone(),
            item_type: QR_ITEM_TYPE.to_string(),
        }
    }

    /// The JSON string handed to the encoder.
    pub fn to_json(&self) -> String {
        // Serialization of three plain strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Capability interface for QR code generation.
///
/// Implementations render the payload into an opaque blob (typically a
/// base64 data URL). Returning `None` means "no code" — callers treat
/// that as a graceful degradation, never an error.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, payload: &QrPayload) -> Option<String>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewInventoryItem;

    #[test]
    fn test_payload_wire_format() {
        let item = InventoryItem::create(NewInventoryItem {
            item_name: "Coke (350ml)".to_string(),
            material_details: String::new(),
            quantity: 10,
            price_cents: 450,
            qr_code: None,
            image: None,
        });

        let payload = QrPayload::for_item(&item);
        let value: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();

        assert_eq!(value["id"], item.id);
        assert_eq!(value["name"], "Coke (350ml)");
        assert_eq!(value["type"], "LELCA_POS_ITEM");
    }
}
