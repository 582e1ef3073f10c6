//! # lelca-core: Pure Business Logic for LELCA POS
//!
//! This crate is the **heart** of LELCA POS. It contains the business
//! rules of the point-of-sale and inventory system with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LELCA POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (single-page app)                   │   │
//! │  │    Catalog UI ──► Cart UI ──► Payment UI ──► Receipt UI         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lelca-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  refund   │  │   stock   │  │   │
//! │  │   │ Inventory │  │   Money   │  │  planner  │  │ classifier│  │   │
//! │  │   │Transaction│  │  TaxRate  │  │  status   │  │ thresholds│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │ grouping  │  │ settings  │  │ validation│                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lelca-db (Storage Layer)                     │   │
//! │  │         SQLite repositories, counters, refund apply step        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types and factories (InventoryItem, Transaction, RefundRecord)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`refund`] - Refund validation and status state machine
//! - [`stock`] - Stock-alert classification and restock suggestions
//! - [`grouping`] - Variant parsing and inventory grouping
//! - [`settings`] - Versioned settings with load-time migration
//! - [`validation`] - Field-level input validation
//! - [`qr`] - QR payload format and encoder capability
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic rules; the clock and RNG touch
//!    nothing but freshly minted ids and timestamps
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64) to avoid float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lelca_core::refund::{plan_refund, RefundRequest};
//! use lelca_core::types::{NewTransaction, PaymentMethod, Transaction, TransactionItem};
//! use lelca_core::TransactionStatus;
//!
//! let txn = Transaction::create(
//!     NewTransaction {
//!         items: vec![TransactionItem {
//!             item_id: "x".into(),
//!             item_name: "Widget".into(),
//!             quantity: 10,
//!             unit_price_cents: 500,
//!             line_total_cents: 5000,
//!         }],
//!         subtotal_cents: 5000,
//!         tax_cents: 0,
//!         total_amount_cents: 5000,
//!         payment_method: PaymentMethod::Cash,
//!         amount_tendered_cents: Some(5000),
//!         change_given_cents: Some(0),
//!         card_details: None,
//!         momo_details: None,
//!         cashier: None,
//!     },
//!     "RCP-123456-007".into(),
//! );
//!
//! // Return 4 of the 10 sold units
//! let plan = plan_refund(&txn, &[RefundRequest { item_id: "x".into(), quantity: 4 }]).unwrap();
//! assert_eq!(plan.new_status, TransactionStatus::PartiallyRefunded);
//! assert_eq!(plan.total_amount_cents, 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod grouping;
pub mod money;
pub mod qr;
pub mod refund;
pub mod settings;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lelca_core::Money` instead of
// `use lelca_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use refund::{plan_refund, RefundMeta, RefundPlan, RefundRequest};
pub use stock::{stock_status, StockStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default low-stock threshold used when settings are absent.
///
/// Items with `quantity < threshold` classify as LOW (or worse).
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Default critical stock level used when settings are absent.
///
/// Items with `0 < quantity < critical` classify as CRITICAL.
pub const DEFAULT_CRITICAL_STOCK_LEVEL: i64 = 3;

/// Restock suggestions target this multiple of the low-stock threshold.
pub const RESTOCK_TARGET_MULTIPLIER: i64 = 3;

/// Cashier name recorded when checkout doesn't supply one.
pub const DEFAULT_CASHIER: &str = "Staff";
