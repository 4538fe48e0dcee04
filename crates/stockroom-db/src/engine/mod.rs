//! # Adjustment Engine
//!
//! The only code path that changes `products.stock`.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request.validate()          no I/O, rejects bad input                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock_for_update             first statement; waits ≤ busy_timeout     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  adjustment::plan            active? enough stock? (pure)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  now = Utc::now()            taken under the lock                      │
//! │  write_stock                                                           │
//! │  LedgerRepository::append                                              │
//! │  (MovementRepository::append, for recorded movements)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT  ──── any error ───► ROLLBACK, nothing persisted               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping an in-flight future drops its `Transaction`, which rolls back.
//! A cancelled caller therefore leaves no stock write and no ledger entry.

pub mod adjuster;
pub mod recorder;

pub use adjuster::StockAdjuster;
pub use recorder::MovementRecorder;

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{error, warn};

use crate::error::DbError;
use crate::repository::ledger::LedgerRepository;
use crate::repository::stock::StockAccessor;
use stockroom_core::adjustment;
use stockroom_core::{Actor, MovementKind, StockAdjustment, StockError, StockResult};

/// Locks the product, applies one change and journals it.
///
/// Must run as the first work inside `conn`'s transaction.
pub(crate) async fn apply_change(
    conn: &mut SqliteConnection,
    kind: MovementKind,
    product_id: i64,
    quantity: i64,
    notes: Option<String>,
    actor: &Actor,
) -> StockResult<StockAdjustment> {
    let mut stock = StockAccessor::new(&mut *conn);

    let snapshot = stock
        .lock_for_update(product_id)
        .await?
        .ok_or(StockError::ProductNotFound(product_id))?;

    let change = adjustment::plan(&snapshot, kind, quantity)?;

    let now = Utc::now();
    stock.write_stock(product_id, change.stock_after, now).await?;
    let product = stock.product(product_id).await?;

    let entry = change.to_ledger_entry(actor.id, notes, now);
    let entry = LedgerRepository::append(&mut *conn, &entry).await?;

    Ok(StockAdjustment { product, entry })
}

/// Commits on success, rolls back on failure.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    outcome: StockResult<T>,
) -> StockResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(DbError::from)?;
            Ok(value)
        }
        Err(err) => {
            // The connection is discarded if rollback fails; nothing commits.
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Deterministic rejections are warnings; store failures are errors.
pub(crate) fn log_failure(err: &StockError) {
    match err {
        StockError::PersistenceFailure { retryable, .. } => {
            error!(error = %err, retryable, "Stock change failed");
        }
        _ => {
            warn!(kind = ?err.kind(), error = %err, "Stock change rejected");
        }
    }
}
