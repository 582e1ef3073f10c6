//! # Versioned Settings
//!
//! One canonical, versioned configuration shape with an explicit
//! migration run once at load time.
//!
//! ## Why Versioned + Migrated?
//! Earlier builds of the storefront persisted a flat settings object
//! (`lowStockThreshold`, `storeName`, … at the top level) and later
//! papered over the change with computed-property fallbacks on a nested
//! object. Here every consumer reads one shape: [`Settings`]. Legacy
//! blobs are converted by [`migrate`] exactly once when the store loads
//! them, and saved back in canonical form.
//!
//! ```text
//! stored JSON ──► migrate() ──► Settings (version = SETTINGS_VERSION)
//!                    │
//!                    ├── v0 flat keys      → lifted into sections
//!                    └── partial sections  → filled from defaults
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::TaxRate;
use crate::{DEFAULT_CRITICAL_STOCK_LEVEL, DEFAULT_LOW_STOCK_THRESHOLD};

/// Current canonical settings version.
pub const SETTINGS_VERSION: u32 = 2;

// =============================================================================
// Sections
// =============================================================================

/// Store identity shown on receipts and refund notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct StoreSettings {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub phone: String,
    pub email: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: "RetailPOS Store".to_string(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            phone: String::new(),
            email: String::new(),
        }
    }
}

/// Receipt/tax configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ReceiptSettings {
    pub tax_enabled: bool,
    /// Tax rate in basis points (1250 = 12.5% VAT).
    pub tax_rate_bps: u32,
    pub tax_name: String,
    pub slogan: String,
    pub thank_you: String,
    pub return_policy: String,
    /// Receipt number prefix ("RCP" unless a custom prefix is set).
    pub number_format: String,
    pub custom_prefix: String,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            tax_enabled: true,
            tax_rate_bps: 1250,
            tax_name: "VAT".to_string(),
            slogan: "Quality and Elegance in Every Piece".to_string(),
            thank_you: "Thank you for your purchase!".to_string(),
            return_policy: "Returns accepted within 7 days with receipt and original packaging"
                .to_string(),
            number_format: "RCP".to_string(),
            custom_prefix: String::new(),
        }
    }
}

impl ReceiptSettings {
    /// The configured tax rate, zero when tax is disabled.
    pub fn tax_rate(&self) -> TaxRate {
        if self.tax_enabled {
            TaxRate::from_bps(self.tax_rate_bps)
        } else {
            TaxRate::zero()
        }
    }
}

/// Inventory thresholds and behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InventorySettings {
    pub low_stock_threshold: i64,
    pub critical_stock_level: i64,
    /// Allow checkout to take stock below zero.
    pub allow_negative_stock: bool,
    pub group_items: bool,
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            critical_stock_level: DEFAULT_CRITICAL_STOCK_LEVEL,
            allow_negative_stock: false,
            group_items: true,
        }
    }
}

/// Alert toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NotificationSettings {
    pub low_stock_alerts: bool,
    pub out_of_stock_alerts: bool,
    pub daily_summary: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            low_stock_alerts: true,
            out_of_stock_alerts: true,
            daily_summary: true,
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// The canonical settings shape. Every consumer reads this; nothing
/// reads raw stored JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Settings {
    pub version: u32,
    pub store: StoreSettings,
    pub receipt: ReceiptSettings,
    pub inventory: InventorySettings,
    pub notifications: NotificationSettings,
}

impl Settings {
    /// Fresh defaults at the current version.
    pub fn current_defaults() -> Settings {
        Settings {
            version: SETTINGS_VERSION,
            ..Settings::default()
        }
    }
}

// =============================================================================
// Migration
// =============================================================================

/// Converts a stored settings blob of any historical shape into the
/// canonical [`Settings`].
///
/// Handles, in order:
/// - v0 flat blobs (`lowStockThreshold` at the top level, no
///   `inventory` section): legacy keys are lifted into their sections.
/// - `receipt.taxRate` as a percentage float (pre-basis-points): value
///   is converted to bps when `taxRateBps` is absent.
/// - Partial blobs: missing sections/fields fill from defaults via
///   serde.
///
/// Unknown keys are dropped. The result always carries
/// [`SETTINGS_VERSION`].
pub fn migrate(raw: serde_json::Value) -> Settings {
    let mut settings = if is_legacy_flat(&raw) {
        migrate_flat(&raw)
    } else {
        let raw = lift_legacy_tax_rate(raw);
        serde_json::from_value(raw).unwrap_or_default()
    };

    settings.version = SETTINGS_VERSION;
    settings
}

/// v0 blobs had flat keys and no nested `inventory` section.
fn is_legacy_flat(raw: &serde_json::Value) -> bool {
    raw.get("lowStockThreshold").is_some() && raw.get("inventory").is_none()
}

fn migrate_flat(raw: &serde_json::Value) -> Settings {
    let mut settings = Settings::default();

    if let Some(threshold) = raw.get("lowStockThreshold").and_then(|v| v.as_i64()) {
        settings.inventory.low_stock_threshold = threshold;
    }
    if let Some(level) = raw.get("criticalStockLevel").and_then(|v| v.as_i64()) {
        settings.inventory.critical_stock_level = level;
    }
    if let Some(name) = raw.get("storeName").and_then(|v| v.as_str()) {
        settings.store.name = name.to_string();
    }
    if let Some(enabled) = raw.get("enableNotifications").and_then(|v| v.as_bool()) {
        settings.notifications.low_stock_alerts = enabled;
        settings.notifications.out_of_stock_alerts = enabled;
    }

    settings
}

/// Pre-bps blobs stored `receipt.taxRate` as a percentage float.
fn lift_legacy_tax_rate(mut raw: serde_json::Value) -> serde_json::Value {
    if let Some(receipt) = raw.get_mut("receipt").and_then(|r| r.as_object_mut()) {
        if !receipt.contains_key("taxRateBps") {
            if let Some(pct) = receipt.get("taxRate").and_then(|v| v.as_f64()) {
                receipt.insert(
                    "taxRateBps".to_string(),
                    serde_json::json!(TaxRate::from_percentage(pct).bps()),
                );
            }
        }
        receipt.remove("taxRate");
    }
    raw
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::current_defaults();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.inventory.low_stock_threshold, 10);
        assert_eq!(settings.inventory.critical_stock_level, 3);
        assert_eq!(settings.receipt.tax_rate_bps, 1250);
        assert!(settings.receipt.tax_enabled);
    }

    #[test]
    fn test_tax_rate_zero_when_disabled() {
        let mut receipt = ReceiptSettings::default();
        assert_eq!(receipt.tax_rate().bps(), 1250);

        receipt.tax_enabled = false;
        assert!(receipt.tax_rate().is_zero());
    }

    #[test]
    fn test_migrate_legacy_flat_blob() {
        let settings = migrate(json!({
            "lowStockThreshold": 15,
            "criticalStockLevel": 5,
            "storeName": "Corner Shop",
            "enableNotifications": false,
            "pexelsApiKey": "ignored"
        }));

        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.inventory.low_stock_threshold, 15);
        assert_eq!(settings.inventory.critical_stock_level, 5);
        assert_eq!(settings.store.name, "Corner Shop");
        assert!(!settings.notifications.low_stock_alerts);
        // Untouched sections come from defaults
        assert_eq!(settings.receipt.tax_name, "VAT");
    }

    #[test]
    fn test_migrate_percentage_tax_rate() {
        let settings = migrate(json!({
            "inventory": { "lowStockThreshold": 12 },
            "receipt": { "taxRate": 12.5 }
        }));

        assert_eq!(settings.receipt.tax_rate_bps, 1250);
        assert_eq!(settings.inventory.low_stock_threshold, 12);
    }

    #[test]
    fn test_migrate_partial_blob_fills_defaults() {
        let settings = migrate(json!({
            "store": { "name": "LELCA" }
        }));

        assert_eq!(settings.store.name, "LELCA");
        assert_eq!(settings.inventory.low_stock_threshold, 10);
        assert!(settings.notifications.daily_summary);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let first = migrate(json!({ "lowStockThreshold": 7 }));
        let round_tripped = migrate(serde_json::to_value(&first).unwrap());
        assert_eq!(first, round_tripped);
    }

    #[test]
    fn test_migrate_garbage_falls_back_to_defaults() {
        let settings = migrate(json!("not an object"));
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.inventory.low_stock_threshold, 10);
    }
}
