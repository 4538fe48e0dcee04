//! # Stock Adjuster
//!
//! `increase` and `decrease`, each one atomic unit of work.

use sqlx::SqlitePool;
use tracing::{info, instrument};

use super::{apply_change, finish, log_failure};
use crate::error::DbError;
use stockroom_core::{AdjustStockRequest, Actor, MovementKind, StockAdjustment, StockResult};

/// Applies validated stock changes under an exclusive product lock.
///
/// ## Usage
/// ```rust,ignore
/// let adjuster = db.adjuster();
///
/// let done = adjuster
///     .decrease(&AdjustStockRequest::new(product_id, 3).with_notes("damaged"), &actor)
///     .await?;
/// assert_eq!(done.entry.stock_after, done.product.stock);
/// ```
///
/// ## Guarantees
/// - The stock write and its ledger entry commit together or not at all
/// - Two adjusters on the same product never read the same base stock
/// - Committed stock is never negative
#[derive(Debug, Clone)]
pub struct StockAdjuster {
    pool: SqlitePool,
}

impl StockAdjuster {
    pub fn new(pool: SqlitePool) -> Self {
        StockAdjuster { pool }
    }

    /// Adds `quantity` to the product's stock.
    ///
    /// ## Errors
    /// * `InvalidQuantity` - quantity ≤ 0, before any I/O
    /// * `ProductNotFound` / `ProductInactive`
    /// * `PersistenceFailure` - retryable when the lock wait timed out
    #[instrument(
        name = "stock.increase",
        skip(self, request, actor),
        fields(product_id = request.product_id, quantity = request.quantity, actor_id = actor.id)
    )]
    pub async fn increase(
        &self,
        request: &AdjustStockRequest,
        actor: &Actor,
    ) -> StockResult<StockAdjustment> {
        self.adjust(MovementKind::Increase, request, actor).await
    }

    /// Removes `quantity` from the product's stock.
    ///
    /// ## Errors
    /// As [`increase`](Self::increase), plus `InsufficientStock` when the
    /// locked stock is below `quantity`.
    #[instrument(
        name = "stock.decrease",
        skip(self, request, actor),
        fields(product_id = request.product_id, quantity = request.quantity, actor_id = actor.id)
    )]
    pub async fn decrease(
        &self,
        request: &AdjustStockRequest,
        actor: &Actor,
    ) -> StockResult<StockAdjustment> {
        self.adjust(MovementKind::Decrease, request, actor).await
    }

    async fn adjust(
        &self,
        kind: MovementKind,
        request: &AdjustStockRequest,
        actor: &Actor,
    ) -> StockResult<StockAdjustment> {
        let result = self.run(kind, request, actor).await;

        match &result {
            Ok(done) => info!(
                entry_id = done.entry.id,
                stock_before = done.entry.stock_before,
                stock_after = done.entry.stock_after,
                "Stock adjusted"
            ),
            Err(err) => log_failure(err),
        }

        result
    }

    async fn run(
        &self,
        kind: MovementKind,
        request: &AdjustStockRequest,
        actor: &Actor,
    ) -> StockResult<StockAdjustment> {
        request.validate()?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let outcome = apply_change(
            &mut tx,
            kind,
            request.product_id,
            request.quantity,
            request.notes.clone(),
            actor,
        )
        .await;

        finish(tx, outcome).await
    }
}
