//! # Validation Module
//!
//! Checks that run before a unit of work is opened.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: THIS MODULE (no I/O, no lock)                                 │
//! │  ├── quantity > 0                                                       │
//! │  ├── destination present iff outbound                                   │
//! │  └── notes length, unit price sign, id shape                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: adjustment::plan (under the row lock)                         │
//! │  ├── product active                                                     │
//! │  └── sufficient stock                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                           │
//! │  ├── Foreign keys                                                       │
//! │  └── Append-only triggers on the ledger                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_movement_context, validate_quantity};
//! use stockroom_core::MovementKind;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_movement_context(MovementKind::Decrease, None).is_err());
//! ```

use crate::error::{StockError, StockResult, ValidationError};
use crate::types::{AdjustStockRequest, MovementKind, RecordMovementRequest};
use crate::MAX_NOTES_LEN;

/// Result type for field-level validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Quantity must be strictly positive.
pub fn validate_quantity(qty: i64) -> StockResult<()> {
    if qty <= 0 {
        return Err(StockError::InvalidQuantity { requested: qty });
    }
    Ok(())
}

/// Entity ids are positive row ids.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Free-text notes are optional but bounded.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

/// Unit price may be zero (free goods) but never negative.
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Destination rule for directional movements.
///
/// ```text
/// DECREASE + store_id = Some(_)  → ok       (withdrawal to a store)
/// DECREASE + store_id = None     → rejected
/// INCREASE + store_id = None     → ok       (goods received)
/// INCREASE + store_id = Some(_)  → rejected
/// ADJUSTMENT                     → rejected (not recordable as a movement)
/// ```
pub fn validate_movement_context(kind: MovementKind, store_id: Option<i64>) -> StockResult<()> {
    match (kind, store_id) {
        (MovementKind::Decrease, Some(id)) if id <= 0 => Err(StockError::invalid_movement(
            format!("destination store id {} is not valid", id),
        )),
        (MovementKind::Decrease, Some(_)) | (MovementKind::Increase, None) => Ok(()),
        (MovementKind::Decrease, None) => Err(StockError::invalid_movement(
            "a destination store is required for DECREASE movements",
        )),
        (MovementKind::Increase, Some(_)) => Err(StockError::invalid_movement(
            "a destination store must not be given for INCREASE movements",
        )),
        (MovementKind::Adjustment, _) => Err(StockError::Validation(ValidationError::NotAllowed {
            field: "movement_kind".to_string(),
            allowed: vec!["INCREASE".to_string(), "DECREASE".to_string()],
        })),
    }
}

// =============================================================================
// Request Validators
// =============================================================================

impl AdjustStockRequest {
    /// Side-effect-free precondition check for `increase` / `decrease`.
    pub fn validate(&self) -> StockResult<()> {
        validate_quantity(self.quantity)?;
        validate_id("product_id", self.product_id)?;
        validate_notes(self.notes.as_deref())?;
        Ok(())
    }
}

impl RecordMovementRequest {
    /// Runs every check the recorder needs before taking any lock.
    pub fn validate(&self) -> StockResult<()> {
        validate_quantity(self.quantity)?;
        validate_movement_context(self.movement_kind, self.store_id)?;
        validate_id("product_id", self.product_id)?;
        validate_unit_price_cents(self.unit_price_cents)?;
        validate_notes(self.notes.as_deref())?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn movement(kind: MovementKind, store_id: Option<i64>) -> RecordMovementRequest {
        RecordMovementRequest {
            movement_kind: kind,
            product_id: 1,
            store_id,
            quantity: 3,
            unit_price_cents: 1250,
            notes: None,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1_000_000).is_ok());
        assert_eq!(
            validate_quantity(0),
            Err(StockError::InvalidQuantity { requested: 0 })
        );
        assert_eq!(
            validate_quantity(-4),
            Err(StockError::InvalidQuantity { requested: -4 })
        );
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("restock from supplier")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN))).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_movement_context_rules() {
        assert!(validate_movement_context(MovementKind::Decrease, Some(2)).is_ok());
        assert!(validate_movement_context(MovementKind::Increase, None).is_ok());

        let err = validate_movement_context(MovementKind::Decrease, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);

        let err = validate_movement_context(MovementKind::Increase, Some(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);

        let err = validate_movement_context(MovementKind::Decrease, Some(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);

        let err = validate_movement_context(MovementKind::Adjustment, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_adjust_request_validate() {
        assert!(AdjustStockRequest::new(1, 5).validate().is_ok());
        assert_eq!(
            AdjustStockRequest::new(1, 0).validate().unwrap_err().kind(),
            ErrorKind::InvalidQuantity
        );
        assert_eq!(
            AdjustStockRequest::new(0, 5).validate().unwrap_err().kind(),
            ErrorKind::ValidationError
        );
    }

    #[test]
    fn test_movement_request_validate() {
        assert!(movement(MovementKind::Decrease, Some(1)).validate().is_ok());
        assert!(movement(MovementKind::Increase, None).validate().is_ok());

        let mut negative_price = movement(MovementKind::Increase, None);
        negative_price.unit_price_cents = -1;
        assert_eq!(
            negative_price.validate().unwrap_err().kind(),
            ErrorKind::ValidationError
        );

        // Quantity is checked first, so it wins over a bad context.
        let mut both_bad = movement(MovementKind::Decrease, None);
        both_bad.quantity = 0;
        assert_eq!(
            both_bad.validate().unwrap_err().kind(),
            ErrorKind::InvalidQuantity
        );
    }
}
