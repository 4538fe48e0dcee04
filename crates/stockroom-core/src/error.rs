//! # Error Types
//!
//! Domain error taxonomy for stock adjustments and movements.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── StockError       - What every adjustment call can fail with       │
//! │  ├── ValidationError  - Field-level input failures                     │
//! │  └── ErrorKind        - Stable machine-readable code per failure       │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Store-of-record failures, folded into          │
//! │                         StockError::PersistenceFailure                 │
//! │                                                                         │
//! │  Flow: ValidationError → StockError ← DbError                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant except `PersistenceFailure` is deterministic: retrying the
//! same call against the same state fails the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Stock Error
// =============================================================================

/// Failures of the adjustment engine and the movement recorder.
///
/// No failure path leaves a partial effect behind: the unit of work either
/// commits the stock write and its ledger entry together or rolls back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Quantity was zero or negative. Raised before any I/O.
    #[error("Invalid quantity {requested}: quantity must be greater than zero")]
    InvalidQuantity { requested: i64 },

    /// Target product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Product exists but its status forbids stock mutation.
    #[error("Product {0} is inactive, stock cannot be adjusted")]
    ProductInactive(i64),

    /// A decrease would drive stock negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Decrease(product 7, qty: 20)
    ///      │
    ///      ▼
    /// Lock row, re-read: stock = 15
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 15, requested: 20 }
    ///      │
    ///      ▼
    /// Rollback: stock stays 15, no ledger entry
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Destination reference inconsistent with movement direction.
    #[error("Invalid movement: {reason}")]
    InvalidMovementContext { reason: String },

    /// Other malformed input (notes too long, negative price, ...).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Store-of-record failure: I/O, lock timeout, deadlock victim.
    ///
    /// `retryable` is true for lock contention; the rollback guarantee makes
    /// a retry safe as long as the caller does not double-submit.
    #[error("Persistence failure: {message}")]
    PersistenceFailure { message: String, retryable: bool },
}

impl StockError {
    /// Creates an `InvalidMovementContext` error.
    pub fn invalid_movement(reason: impl Into<String>) -> Self {
        StockError::InvalidMovementContext {
            reason: reason.into(),
        }
    }

    /// Creates a non-retryable `PersistenceFailure`.
    pub fn persistence(message: impl Into<String>) -> Self {
        StockError::PersistenceFailure {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns the stable error code for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StockError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            StockError::ProductNotFound(_) => ErrorKind::ProductNotFound,
            StockError::ProductInactive(_) => ErrorKind::ProductInactive,
            StockError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            StockError::InvalidMovementContext { .. } => ErrorKind::InvalidMovementContext,
            StockError::Validation(_) => ErrorKind::ValidationError,
            StockError::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
        }
    }

    /// Whether the caller may safely retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StockError::PersistenceFailure {
                retryable: true,
                ..
            }
        )
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Machine-readable error code handed to the presentation layer.
///
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for product 7: ..." }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidQuantity,
    ProductNotFound,
    ProductInactive,
    InsufficientStock,
    InvalidMovementContext,
    ValidationError,
    PersistenceFailure,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the request validators before any unit of work is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with StockError.
pub type StockResult<T> = Result<T, StockError>;

// =============================================================================
// Unit Tests
// =============================================================================
