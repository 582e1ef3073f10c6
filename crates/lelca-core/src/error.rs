//! # Error Types
//!
//! Domain-specific error types for lelca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lelca-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations (refund engine, etc.) │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lelca-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → UI layer                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, remaining quantity, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Transaction cannot be found in the ledger.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Inventory item cannot be found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A refund was requested for an item that is not part of the transaction.
    ///
    /// ## When This Occurs
    /// - Caller passes an item id that never appeared on the receipt
    /// - Stale UI state referencing a different transaction
    #[error("Item {item_id} not found in transaction")]
    ItemNotInTransaction { item_id: String },

    /// Refund attempted on a transaction that is already fully refunded.
    ///
    /// `Refunded` is terminal: the operation is rejected before any
    /// inventory mutation occurs.
    #[error("Transaction {transaction_id} is already fully refunded")]
    AlreadyRefunded { transaction_id: String },

    /// Requested refund quantity exceeds what is still refundable.
    ///
    /// ## User Workflow
    /// ```text
    /// Sold: 10 × Widget
    /// Refunded earlier: 7
    ///      │
    ///      ▼
    /// Request: refund 4
    ///      │
    ///      ▼
    /// OverRefund { requested: 4, remaining: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Cannot refund 4 of Widget. Only 3 remaining."
    /// ```
    ///
    /// The whole refund batch is rejected; no item in the request is
    /// applied partially.
    #[error("Cannot refund {requested} of {item_name}. Only {remaining} remaining.")]
    OverRefund {
        item_id: String,
        item_name: String,
        requested: i64,
        remaining: i64,
    },

    /// No items survived refund validation/filtering.
    ///
    /// A refund must move at least one unit.
    #[error("No items selected for refund")]
    EmptyRefund,

    /// Insufficient stock to complete a sale.
    ///
    /// Only raised when negative stock is disallowed by settings.
    #[error("Insufficient stock for {item_name}: available {available}, requested {requested}")]
    InsufficientStock {
        item_name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs; no mutation
/// happens when one is raised.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparseable number, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
