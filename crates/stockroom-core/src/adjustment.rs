//! # Adjustment Rules
//!
//! The decision an adjustment makes once it holds the row lock.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockroom-db (I/O)                 stockroom-core (THIS MODULE)        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │  lock + re-read row ──► StockSnapshot ──► plan(snapshot, kind, qty)     │
//! │                                              │                          │
//! │                                              ├── inactive?  → Err       │
//! │                                              ├── too few?   → Err       │
//! │                                              └── StockChange            │
//! │  write stock_after  ◄────────────────────────────┘                      │
//! │  append ledger entry                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `plan` must only be fed a snapshot read under the lock of the same unit
//! of work; given a stale snapshot it would compute from the wrong base.

use chrono::{DateTime, Utc};

use crate::error::{StockError, StockResult, ValidationError};
use crate::types::{MovementKind, NewLedgerEntry, StockSnapshot};
use crate::validation::validate_quantity;

/// The computed effect of one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: i64,
    pub kind: MovementKind,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
}

impl StockChange {
    /// Builds the ledger entry recording this change.
    pub fn to_ledger_entry(
        &self,
        created_by: i64,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> NewLedgerEntry {
        NewLedgerEntry {
            product_id: self.product_id,
            movement_kind: self.kind,
            quantity: self.quantity,
            stock_before: self.stock_before,
            stock_after: self.stock_after,
            notes,
            created_by,
            created_at,
        }
    }
}

/// Decides an INCREASE or DECREASE against a locked snapshot.
///
/// ## Rules
/// 1. `quantity > 0`
/// 2. product status must be ACTIVE
/// 3. DECREASE needs `stock >= quantity`
/// 4. the new stock must fit in an i64
pub fn plan(snapshot: &StockSnapshot, kind: MovementKind, quantity: i64) -> StockResult<StockChange> {
    validate_quantity(quantity)?;

    if !snapshot.status.is_active() {
        return Err(StockError::ProductInactive(snapshot.id));
    }

    let stock_before = snapshot.stock;
    let stock_after = match kind {
        MovementKind::Increase => stock_before.checked_add(quantity).ok_or_else(|| {
            StockError::Validation(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            })
        })?,
        MovementKind::Decrease => {
            if stock_before < quantity {
                return Err(StockError::InsufficientStock {
                    product_id: snapshot.id,
                    available: stock_before,
                    requested: quantity,
                });
            }
            stock_before - quantity
        }
        MovementKind::Adjustment => {
            return Err(StockError::Validation(ValidationError::NotAllowed {
                field: "movement_kind".to_string(),
                allowed: vec!["INCREASE".to_string(), "DECREASE".to_string()],
            }))
        }
    };

    Ok(StockChange {
        product_id: snapshot.id,
        kind,
        quantity,
        stock_before,
        stock_after,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
