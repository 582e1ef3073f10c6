//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  UI / callers                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (this module) ← SQL lives here, nowhere else               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool → SQLite                                                   │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Callers never see SQL                                               │
//! │  • Cross-collection writes stay in one place (and one SQL txn)         │
//! │  • Repositories are cheap to clone (pool handle)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Repositories
//!
//! - [`inventory`] - Inventory CRUD, bulk import/update, stock adjustment
//! - [`transaction`] - Sales ledger, refund engine, period reporting
//! - [`settings`] - Versioned settings blob

pub mod inventory;
pub mod settings;
pub mod transaction;
