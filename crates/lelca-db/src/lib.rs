//! # lelca-db: Storage Layer for LELCA POS
//!
//! This crate provides durable storage for the LELCA POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LELCA POS Data Flow                              │
//! │                                                                         │
//! │  Checkout / Refund / Inventory UI                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lelca-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ inventory.rs  │    │  (embedded)  │  │   │
//! │  │   │               │    │ transaction.rs│    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ settings.rs   │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │ + numbering   │    │ ...          │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (one per store)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`numbering`] - Receipt / refund note number issuance
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lelca_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/lelca.db")).await?;
//!
//! // Checkout
//! let txn = db.transactions().record_sale(checkout, false).await?;
//!
//! // Later: partial refund, atomically restoring stock
//! let updated = db
//!     .transactions()
//!     .refund(&txn.transaction_id, meta, &requests)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod numbering;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::inventory::{BulkUpdate, InventoryItemPatch, InventoryRepository};
pub use repository::settings::SettingsRepository;
pub use repository::transaction::{
    DailySales, PaymentMethodStat, SalesMetrics, TopSellingItem, TransactionRepository,
};
