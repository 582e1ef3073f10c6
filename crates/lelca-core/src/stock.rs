//! # Stock Classification
//!
//! Low stock detection, status calculation, and restock suggestions.
//!
//! Every other component leans on these rules to decide urgency: the
//! inventory UI colors badges with them, reports bucket items with them,
//! and restock flows size orders with them. Pure functions only; callers
//! apply suggested deltas through the inventory store.
//!
//! ## Classification Rule (first match wins)
//! ```text
//! quantity == 0              → OUT_OF_STOCK
//! quantity <  critical_level → CRITICAL
//! quantity <  threshold      → LOW
//! quantity <  2 × threshold  → MEDIUM
//! otherwise                  → WELL_STOCKED
//! ```
//! Thresholds are exclusive lower bounds: `quantity == threshold`
//! classifies as MEDIUM, `quantity == critical_level` as LOW.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::InventoryItem;
use crate::RESTOCK_TARGET_MULTIPLIER;

// =============================================================================
// Stock Status
// =============================================================================

/// Classification of an item's quantity relative to configured
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum StockStatus {
    OutOfStock,
    Critical,
    Low,
    Medium,
    WellStocked,
}

impl StockStatus {
    /// Human-readable status label.
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::WellStocked => "Well Stocked",
            StockStatus::Medium => "Medium Stock",
            StockStatus::Low => "Low Stock",
            StockStatus::Critical => "Critical",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }

    /// Priority rank for sorting (most urgent first).
    ///
    /// OUT_OF_STOCK > CRITICAL > LOW > MEDIUM > WELL_STOCKED
    pub fn priority(&self) -> u8 {
        match self {
            StockStatus::OutOfStock => 0,
            StockStatus::Critical => 1,
            StockStatus::Low => 2,
            StockStatus::Medium => 3,
            StockStatus::WellStocked => 4,
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Classifies a quantity against the configured thresholds.
///
/// ## Example
/// ```rust
/// use lelca_core::stock::{stock_status, StockStatus};
///
/// assert_eq!(stock_status(0, 10, 3), StockStatus::OutOfStock);
/// assert_eq!(stock_status(2, 10, 3), StockStatus::Critical);
/// assert_eq!(stock_status(3, 10, 3), StockStatus::Low);
/// assert_eq!(stock_status(10, 10, 3), StockStatus::Medium);
/// assert_eq!(stock_status(20, 10, 3), StockStatus::WellStocked);
/// ```
pub fn stock_status(quantity: i64, low_stock_threshold: i64, critical_level: i64) -> StockStatus {
    if quantity == 0 {
        return StockStatus::OutOfStock;
    }
    if quantity < critical_level {
        return StockStatus::Critical;
    }
    if quantity < low_stock_threshold {
        return StockStatus::Low;
    }
    if quantity < low_stock_threshold * 2 {
        return StockStatus::Medium;
    }
    StockStatus::WellStocked
}

/// Suggested restock quantity: bring stock up to threshold × 3.
///
/// Returns the delta to add, never negative. Callers apply it through
/// the inventory store's quantity adjustment.
pub fn restock_suggestion(current_qty: i64, low_stock_threshold: i64) -> i64 {
    let target_qty = low_stock_threshold * RESTOCK_TARGET_MULTIPLIER;
    (target_qty - current_qty).max(0)
}

// =============================================================================
// Inventory Filters
// =============================================================================

/// Items below the low stock threshold (includes critical and
/// out-of-stock).
pub fn low_stock_items(inventory: &[InventoryItem], threshold: i64) -> Vec<&InventoryItem> {
    inventory.iter().filter(|i| i.quantity < threshold).collect()
}

/// Items at critical level (but not yet out of stock).
pub fn critical_items(inventory: &[InventoryItem], critical_level: i64) -> Vec<&InventoryItem> {
    inventory
        .iter()
        .filter(|i| i.quantity < critical_level && i.quantity > 0)
        .collect()
}

/// Items with zero stock.
pub fn out_of_stock_items(inventory: &[InventoryItem]) -> Vec<&InventoryItem> {
    inventory.iter().filter(|i| i.quantity == 0).collect()
}

/// Sorts items by restock priority: most urgent status first, then
/// lowest quantity within the same status.
pub fn sorted_by_priority(
    inventory: &[InventoryItem],
    threshold: i64,
    critical_level: i64,
) -> Vec<&InventoryItem> {
    let mut items: Vec<&InventoryItem> = inventory.iter().collect();
    items.sort_by(|a, b| {
        let pa = stock_status(a.quantity, threshold, critical_level).priority();
        let pb = stock_status(b.quantity, threshold, critical_level).priority();
        pa.cmp(&pb).then(a.quantity.cmp(&b.quantity))
    });
    items
}

/// Total value tied up in a set of items (price × remaining quantity).
///
/// Used by reports to show value at risk for low-stock items.
pub fn value_at_risk<'a, I>(items: I) -> Money
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    items.into_iter().map(|i| i.stock_value()).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(name: &str, quantity: i64, price_cents: i64) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: name.to_string(),
            item_name: name.to_string(),
            material_details: String::new(),
            quantity,
            price_cents,
            qr_code: None,
            image: None,
            date_added: now,
            last_updated: now,
        }
    }

    #[test]
    fn test_classification_boundaries() {
        // quantity == threshold is MEDIUM, not LOW (exclusive bound)
        assert_eq!(stock_status(10, 10, 3), StockStatus::Medium);
        assert_eq!(stock_status(9, 10, 3), StockStatus::Low);

        // quantity == critical_level is LOW, not CRITICAL
        assert_eq!(stock_status(3, 10, 3), StockStatus::Low);
        assert_eq!(stock_status(2, 10, 3), StockStatus::Critical);

        assert_eq!(stock_status(0, 10, 3), StockStatus::OutOfStock);
        assert_eq!(stock_status(19, 10, 3), StockStatus::Medium);
        assert_eq!(stock_status(20, 10, 3), StockStatus::WellStocked);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for qty in 0..50 {
            assert_eq!(stock_status(qty, 10, 3), stock_status(qty, 10, 3));
        }
    }

    #[test]
    fn test_restock_suggestion_targets_triple_threshold() {
        assert_eq!(restock_suggestion(5, 10), 25);
        assert_eq!(restock_suggestion(0, 10), 30);
        // Already above target: suggest nothing, never negative
        assert_eq!(restock_suggestion(45, 10), 0);
    }

    #[test]
    fn test_filters() {
        let inventory = vec![
            item("a", 0, 100),
            item("b", 2, 100),
            item("c", 5, 100),
            item("d", 25, 100),
        ];

        let low = low_stock_items(&inventory, 10);
        assert_eq!(low.len(), 3);

        let critical = critical_items(&inventory, 3);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].item_name, "b");

        let out = out_of_stock_items(&inventory);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item_name, "a");
    }

    #[test]
    fn test_sorted_by_priority() {
        let inventory = vec![
            item("well", 30, 100),
            item("low", 5, 100),
            item("out", 0, 100),
            item("critical", 1, 100),
            item("lower", 4, 100),
        ];

        let sorted = sorted_by_priority(&inventory, 10, 3);
        let names: Vec<&str> = sorted.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["out", "critical", "lower", "low", "well"]);
    }

    #[test]
    fn test_value_at_risk() {
        let inventory = vec![item("a", 2, 500), item("b", 3, 250)];
        let total = value_at_risk(inventory.iter());
        assert_eq!(total.cents(), 2 * 500 + 3 * 250);
    }
}
