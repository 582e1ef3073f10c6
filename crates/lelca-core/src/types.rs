//! # Domain Types
//!
//! Core domain types used throughout LELCA POS, plus the factories that
//! construct them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │  Transaction    │   │  RefundRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  transaction_id │   │  refund_note_no │       │
//! │  │  item_name      │   │  receipt_number │   │  refund_date    │       │
//! │  │  quantity       │   │  items (frozen) │   │  items (frozen) │       │
//! │  │  price_cents    │   │  status/refunds │   │  total/reason   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │ PaymentMethod   │   │ TransactionStatus   │                         │
//! │  │  Cash           │   │  Completed          │                         │
//! │  │  Card           │   │  Partially Refunded │                         │
//! │  │  Mobile Money   │   │  Refunded           │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - opaque, immutable, used for storage relations
//! - Business ID: (receipt_number, refund_note_number) - human-readable,
//!   printed on documents, issued by the ledger's numbering service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::DEFAULT_CASHIER;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// Exactly one of the method-specific detail payloads on [`Transaction`]
/// is populated for the chosen method; [`Transaction::create`] nulls the
/// others.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash payment (tendered amount + change given).
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Mobile money transfer.
    #[serde(rename = "Mobile Money")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Mobile Money"))]
    MobileMoney,
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a transaction in the ledger.
///
/// ## State Machine
/// ```text
/// Completed ──► Partially Refunded ──► Refunded (terminal)
///     │                                   ▲
///     └───────────────────────────────────┘
/// ```
/// `Refunded` is terminal: no operation transitions out of it, and the
/// refund engine rejects further refunds with `AlreadyRefunded`.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TransactionStatus {
    /// Sale completed at checkout; nothing returned yet.
    Completed,
    /// Some, but not all, sold units have been returned.
    #[serde(rename = "Partially Refunded")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Partially Refunded"))]
    PartiallyRefunded,
    /// Every sold unit has been returned. Terminal.
    Refunded,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// An item in the store's inventory.
///
/// `quantity` is the authoritative on-hand stock count: checkout deducts
/// from it, restocks and refund-driven restoration add to it.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    /// Display name. May encode a "Base (variant)" pattern consumed by
    /// the grouping helpers.
    pub item_name: String,

    /// Free-text description of the material/make.
    pub material_details: String,

    /// On-hand stock count. Never negative unless negative stock is
    /// explicitly allowed in settings.
    pub quantity: i64,

    /// Unit sale price in cents.
    pub price_cents: i64,

    /// Optional QR code blob (data URL). Display-only.
    pub qr_code: Option<String>,

    /// Optional image blob or URL. Display-only.
    pub image: Option<String>,

    /// When the item was added.
    #[ts(as = "String")]
    pub date_added: DateTime<Utc>,

    /// Stamped on every mutation (edit, checkout deduction, restock,
    /// refund restoration).
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Value of the remaining stock (price × quantity).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    /// Creates a new inventory item from user-supplied fields.
    ///
    /// Generates the opaque `id` and stamps `date_added == last_updated`.
    /// Callers validate the fields first (see [`crate::validation`]); the
    /// factory only shapes data.
    pub fn create(fields: NewInventoryItem) -> InventoryItem {
        let now = Utc::now();

        InventoryItem {
            id: Uuid::new_v4().to_string(),
            item_name: fields.item_name,
            material_details: fields.material_details,
            quantity: fields.quantity,
            price_cents: fields.price_cents,
            qr_code: fields.qr_code,
            image: fields.image,
            date_added: now,
            last_updated: now,
        }
    }
}

/// Fields supplied when creating an inventory item (manual add or bulk
/// import row).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewInventoryItem {
    pub item_name: String,
    #[serde(default)]
    pub material_details: String,
    pub quantity: i64,
    pub price_cents: i64,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// Transaction Line Item
// =============================================================================

/// A line item in a transaction.
///
/// Uses the snapshot pattern: name and unit price are frozen at the time
/// of sale and do not track later inventory edits.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionItem {
    /// References `InventoryItem::id`.
    #[serde(rename = "id")]
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub item_name: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Refund Record
// =============================================================================

/// One returned line within a refund record.
///
/// A snapshot of exactly what was returned in *this* refund action,
/// not cumulative across refunds.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundItem {
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A single refund action against a transaction.
///
/// Refunds are an append-only event log per transaction rather than a
/// mutable refunded-quantity counter: the full audit trail (when, why,
/// what) survives multiple partial refunds and historical refund notes
/// can be reprinted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundRecord {
    /// Human-facing note number, `REF-<5-digit counter>`. Unique,
    /// monotonically issued.
    pub refund_note_number: String,

    /// When the refund was processed.
    #[ts(as = "String")]
    pub refund_date: DateTime<Utc>,

    /// What was returned in this action.
    pub items: Vec<RefundItem>,

    /// Sum of this record's line totals, in cents.
    pub total_amount_cents: i64,

    /// Operator-supplied reason.
    pub reason: String,

    /// Optional free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl RefundRecord {
    /// Quantity returned for one item in this record.
    pub fn quantity_for(&self, item_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|i| i.item_id == item_id)
            .map(|i| i.quantity)
            .sum()
    }

    /// Total units returned in this record, across all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale and its embedded refund history.
///
/// Created once at checkout completion. `status` and `refunds` are the
/// only fields ever mutated post-creation, exclusively by the refund
/// engine. Transactions are never physically deleted in normal
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    /// Unique identifier (UUID v4). Immutable.
    pub transaction_id: String,

    /// Human-facing receipt number, `RCP-<timestamp tail>-<random>`.
    pub receipt_number: String,

    /// Creation timestamp. Immutable once set.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Frozen snapshot of what was sold.
    pub items: Vec<TransactionItem>,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// `subtotal + tax` at creation time; never recomputed after
    /// refunds.
    pub total_amount_cents: i64,

    pub payment_method: PaymentMethod,

    /// Cash only: amount the customer handed over.
    pub amount_tendered_cents: Option<i64>,
    /// Cash only: change returned.
    pub change_given_cents: Option<i64>,
    /// Card only: masked card reference.
    pub card_details: Option<String>,
    /// Mobile Money only: network/number reference.
    pub momo_details: Option<String>,

    pub status: TransactionStatus,

    /// Operator who rang up the sale.
    pub cashier: String,

    /// Append-only refund history, insertion order = chronological.
    #[serde(default)]
    pub refunds: Vec<RefundRecord>,
}

impl Transaction {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Looks up the original line item for an inventory item id.
    pub fn line_item(&self, item_id: &str) -> Option<&TransactionItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    /// Total units sold across all line items.
    pub fn total_sold_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Units already refunded for one item, summed over all prior
    /// refund records.
    pub fn refunded_quantity_for(&self, item_id: &str) -> i64 {
        self.refunds.iter().map(|r| r.quantity_for(item_id)).sum()
    }

    /// Units already refunded across all items and refund records.
    pub fn total_refunded_quantity(&self) -> i64 {
        self.refunds.iter().map(|r| r.total_quantity()).sum()
    }

    /// Creates a transaction from a finished checkout.
    ///
    /// `receipt_number` is issued by the ledger's numbering service and
    /// passed in; the factory itself only stamps ids, the timestamp, and
    /// shapes the payment payloads. Line items are copied by value, so
    /// the record cannot alias the caller's live cart.
    ///
    /// Payment detail payloads that do not match `payment_method` are
    /// cleared: a Card transaction never carries `amount_tendered_cents`,
    /// a Cash transaction never carries `card_details`, and so on.
    pub fn create(fields: NewTransaction, receipt_number: String) -> Transaction {
        let method = fields.payment_method;

        Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            receipt_number,
            date: Utc::now(),
            items: fields.items,
            subtotal_cents: fields.subtotal_cents,
            tax_cents: fields.tax_cents,
            total_amount_cents: fields.total_amount_cents,
            payment_method: method,
            amount_tendered_cents: match method {
                PaymentMethod::Cash => fields.amount_tendered_cents,
                _ => None,
            },
            change_given_cents: match method {
                PaymentMethod::Cash => fields.change_given_cents,
                _ => None,
            },
            card_details: match method {
                PaymentMethod::Card => fields.card_details,
                _ => None,
            },
            momo_details: match method {
                PaymentMethod::MobileMoney => fields.momo_details,
                _ => None,
            },
            status: TransactionStatus::Completed,
            cashier: fields
                .cashier
                .unwrap_or_else(|| DEFAULT_CASHIER.to_string()),
            refunds: Vec::new(),
        }
    }
}

/// Fields supplied by the checkout flow when creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewTransaction {
    pub items: Vec<TransactionItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub amount_tendered_cents: Option<i64>,
    #[serde(default)]
    pub change_given_cents: Option<i64>,
    #[serde(default)]
    pub card_details: Option<String>,
    #[serde(default)]
    pub momo_details: Option<String>,
    #[serde(default)]
    pub cashier: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cash_checkout() -> NewTransaction {
        NewTransaction {
            items: vec![TransactionItem {
                item_id: "x".to_string(),
                item_name: "Widget".to_string(),
                quantity: 10,
                unit_price_cents: 500,
                line_total_cents: 5000,
            }],
            subtotal_cents: 5000,
            tax_cents: 0,
            total_amount_cents: 5000,
            payment_method: PaymentMethod::Cash,
            amount_tendered_cents: Some(6000),
            change_given_cents: Some(1000),
            card_details: Some("should be cleared".to_string()),
            momo_details: Some("should be cleared".to_string()),
            cashier: None,
        }
    }

    #[test]
    fn test_create_item_stamps_timestamps() {
        let item = InventoryItem::create(NewInventoryItem {
            item_name: "Coke (350ml)".to_string(),
            material_details: "Glass bottle".to_string(),
            quantity: 24,
            price_cents: 450,
            qr_code: None,
            image: None,
        });

        assert!(!item.id.is_empty());
        assert_eq!(item.date_added, item.last_updated);
        assert_eq!(item.stock_value().cents(), 24 * 450);
    }

    #[test]
    fn test_create_transaction_nulls_mismatched_payment_fields() {
        let txn = Transaction::create(cash_checkout(), "RCP-123456-007".to_string());

        assert_eq!(txn.payment_method, PaymentMethod::Cash);
        assert_eq!(txn.amount_tendered_cents, Some(6000));
        assert_eq!(txn.change_given_cents, Some(1000));
        assert_eq!(txn.card_details, None);
        assert_eq!(txn.momo_details, None);
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert_eq!(txn.cashier, DEFAULT_CASHIER);
        assert!(txn.refunds.is_empty());
    }

    #[test]
    fn test_create_card_transaction_keeps_only_card_details() {
        let mut fields = cash_checkout();
        fields.payment_method = PaymentMethod::Card;
        fields.card_details = Some("**** 4242".to_string());

        let txn = Transaction::create(fields, "RCP-654321-001".to_string());

        assert_eq!(txn.card_details.as_deref(), Some("**** 4242"));
        assert_eq!(txn.amount_tendered_cents, None);
        assert_eq!(txn.change_given_cents, None);
        assert_eq!(txn.momo_details, None);
    }

    #[test]
    fn test_status_serde_matches_display_strings() {
        let json = serde_json::to_string(&TransactionStatus::PartiallyRefunded).unwrap();
        assert_eq!(json, "\"Partially Refunded\"");

        let json = serde_json::to_string(&PaymentMethod::MobileMoney).unwrap();
        assert_eq!(json, "\"Mobile Money\"");
    }

    #[test]
    fn test_refund_quantity_helpers() {
        let mut txn = Transaction::create(cash_checkout(), "RCP-000000-000".to_string());
        txn.refunds.push(RefundRecord {
            refund_note_number: "REF-00001".to_string(),
            refund_date: Utc::now(),
            items: vec![RefundItem {
                item_id: "x".to_string(),
                item_name: "Widget".to_string(),
                quantity: 4,
                unit_price_cents: 500,
                line_total_cents: 2000,
            }],
            total_amount_cents: 2000,
            reason: "Damaged".to_string(),
            notes: None,
        });

        assert_eq!(txn.total_sold_quantity(), 10);
        assert_eq!(txn.refunded_quantity_for("x"), 4);
        assert_eq!(txn.refunded_quantity_for("y"), 0);
        assert_eq!(txn.total_refunded_quantity(), 4);
    }

    #[test]
    fn test_line_items_serialize_with_wire_key_names() {
        let txn = Transaction::create(cash_checkout(), "RCP-111111-002".to_string());
        let value = serde_json::to_value(&txn).unwrap();

        // Transaction line items use "id"; refund items use "itemId".
        assert!(value["items"][0].get("id").is_some());
        assert_eq!(value["items"][0]["id"], "x");
    }
}
