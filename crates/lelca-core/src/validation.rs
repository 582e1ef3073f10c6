//! # Validation Module
//!
//! Input validation for inventory and checkout data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Forms (UI)                                                   │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field-level rules, reported per field                             │
//! │  └── Runs before any factory construction or mutation                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints (receipt + refund note numbers)                │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators are separate from the factories: the factories only shape
//! data, these functions decide whether the data is acceptable. A
//! validation failure means no mutation happened anywhere.

use crate::error::ValidationError;
use crate::types::NewInventoryItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an item display name.
///
/// ## Example
/// ```rust
/// use lelca_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Coke (350ml)").is_ok());
/// assert!(validate_item_name("").is_err());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "itemName".to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity.
///
/// Zero is allowed (out of stock); negative is not.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// Zero is allowed (free items); negative is not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the fields for a new inventory item, collecting every
/// violation so a form can highlight all offending fields at once.
pub fn validate_new_item(fields: &NewInventoryItem) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_item_name(&fields.item_name) {
        errors.push(e);
    }
    if let Err(e) = validate_quantity(fields.quantity) {
        errors.push(e);
    }
    if let Err(e) = validate_price_cents(fields.price_cents) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, quantity: i64, price_cents: i64) -> NewInventoryItem {
        NewInventoryItem {
            item_name: name.to_string(),
            material_details: String::new(),
            quantity,
            price_cents,
            qr_code: None,
            image: None,
        }
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Coke (350ml)").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(24).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(450).is_ok());
        assert!(validate_price_cents(-450).is_err());
    }

    #[test]
    fn test_validate_new_item_collects_all_errors() {
        assert!(validate_new_item(&fields("Coke", 10, 450)).is_ok());

        let errors = validate_new_item(&fields("", -1, -5)).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
