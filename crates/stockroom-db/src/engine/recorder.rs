//! # Movement Recorder
//!
//! Directional movements with valuation: goods received (INCREASE, no
//! store) and goods sent to a store (DECREASE, store required).
//!
//! A recorded movement goes through the same locked path as a plain
//! adjustment. Its unit of work writes three rows that commit together:
//! the new stock, a ledger entry and the movement itself.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument};

use super::{apply_change, finish, log_failure};
use crate::error::DbError;
use crate::repository::movement::MovementRepository;
use crate::repository::store::StoreRepository;
use stockroom_core::{
    Actor, Money, Movement, NewMovement, Page, PageRequest, RecordMovementRequest,
    RecordedMovement, StockError, StockResult, ValidationError, ValuationSummary,
};

/// Records movements and serves movement reads.
#[derive(Debug, Clone)]
pub struct MovementRecorder {
    pool: SqlitePool,
}

impl MovementRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRecorder { pool }
    }

    /// Records one movement and applies its stock effect.
    ///
    /// ## Errors
    /// * `InvalidQuantity` - quantity ≤ 0
    /// * `InvalidMovementContext` - store missing on DECREASE, present on
    ///   INCREASE, unknown, or inactive
    /// * `Validation` - negative price, total overflows, notes too long
    /// * `ProductNotFound` / `ProductInactive` / `InsufficientStock`
    /// * `PersistenceFailure`
    #[instrument(
        name = "stock.record_movement",
        skip(self, request, actor),
        fields(
            kind = %request.movement_kind,
            product_id = request.product_id,
            store_id = ?request.store_id,
            quantity = request.quantity,
            actor_id = actor.id
        )
    )]
    pub async fn record(
        &self,
        request: &RecordMovementRequest,
        actor: &Actor,
    ) -> StockResult<RecordedMovement> {
        let result = self.run(request, actor).await;

        match &result {
            Ok(done) => info!(
                movement_id = done.movement.id,
                entry_id = done.entry.id,
                total_amount = %done.movement.total_amount(),
                stock_after = done.entry.stock_after,
                "Movement recorded"
            ),
            Err(err) => log_failure(err),
        }

        result
    }

    async fn run(&self, request: &RecordMovementRequest, actor: &Actor) -> StockResult<RecordedMovement> {
        request.validate()?;

        let total = request
            .unit_price()
            .checked_multiply_quantity(request.quantity)
            .ok_or_else(|| {
                StockError::Validation(ValidationError::OutOfRange {
                    field: "total_amount".to_string(),
                    min: 0,
                    max: i64::MAX,
                })
            })?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let outcome = record_locked(&mut tx, request, total, actor).await;
        finish(tx, outcome).await
    }

    /// Latest movements of a product, newest first.
    pub async fn list_by_product(&self, product_id: i64, limit: i64) -> StockResult<Vec<Movement>> {
        Ok(self.repository().list_by_product(product_id, limit).await?)
    }

    /// Latest movements delivered to a store, newest first.
    pub async fn list_by_store(&self, store_id: i64, limit: i64) -> StockResult<Vec<Movement>> {
        Ok(self.repository().list_by_store(store_id, limit).await?)
    }

    /// All movements, paged.
    pub async fn list(&self, page: PageRequest) -> StockResult<Page<Movement>> {
        Ok(self.repository().list(page).await?)
    }

    /// Inbound/outbound valuation over every recorded movement.
    pub async fn summary(&self) -> StockResult<ValuationSummary> {
        self.repository().summary().await
    }

    fn repository(&self) -> MovementRepository {
        MovementRepository::new(self.pool.clone())
    }
}

async fn record_locked(
    conn: &mut SqliteConnection,
    request: &RecordMovementRequest,
    total: Money,
    actor: &Actor,
) -> StockResult<RecordedMovement> {
    // Product lock first; the store lookup is a read and may not precede it.
    let applied = apply_change(
        &mut *conn,
        request.movement_kind,
        request.product_id,
        request.quantity,
        request.notes.clone(),
        actor,
    )
    .await?;

    if let Some(store_id) = request.store_id {
        match StoreRepository::find_in(&mut *conn, store_id).await? {
            None => {
                return Err(StockError::invalid_movement(format!(
                    "destination store {} does not exist",
                    store_id
                )))
            }
            Some(store) if !store.status.is_active() => {
                return Err(StockError::invalid_movement(format!(
                    "destination store {} is inactive",
                    store_id
                )))
            }
            Some(_) => {}
        }
    }

    let movement = MovementRepository::append(
        &mut *conn,
        &NewMovement {
            movement_kind: request.movement_kind,
            product_id: request.product_id,
            store_id: request.store_id,
            quantity: request.quantity,
            unit_price: request.unit_price(),
            total_amount: total,
            notes: request.notes.clone(),
            created_by: actor.id,
            movement_date: applied.entry.created_at,
        },
    )
    .await?;

    Ok(RecordedMovement {
        movement,
        entry: applied.entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::{ErrorKind, MovementKind, NewProduct, Role, Status};

    struct Fixture {
        db: Database,
        product_id: i64,
        store_id: i64,
        actor: Actor,
    }

    async fn setup(stock: i64) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().insert("admin", "Admin", Role::Admin).await.unwrap();
        let store = db.stores().insert("WEST", "West Branch").await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                sku: "SUGAR-1KG".to_string(),
                name: "Sugar 1kg".to_string(),
                price_cents: 300,
                initial_stock: stock,
            })
            .await
            .unwrap();
        Fixture {
            db,
            product_id: product.id,
            store_id: store.id,
            actor: user.actor(),
        }
    }

    fn request(kind: MovementKind, product_id: i64, store_id: Option<i64>, qty: i64) -> RecordMovementRequest {
        RecordMovementRequest {
            movement_kind: kind,
            product_id,
            store_id,
            quantity: qty,
            unit_price_cents: 350,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_outbound_movement() {
        let f = setup(10).await;

        let done = f
            .db
            .recorder()
            .record(
                &request(MovementKind::Decrease, f.product_id, Some(f.store_id), 4),
                &f.actor,
            )
            .await
            .unwrap();

        assert_eq!(done.movement.store_id, Some(f.store_id));
        assert_eq!(done.movement.total_amount(), Money::from_cents(1400));
        assert_eq!(done.movement.movement_date, done.entry.created_at);
        assert_eq!(done.entry.stock_before, 10);
        assert_eq!(done.entry.stock_after, 6);

        let product = f.db.products().get_by_id(f.product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 6);
    }

    #[tokio::test]
    async fn test_decrease_without_store_rejected_before_io() {
        let f = setup(10).await;

        let err = f
            .db
            .recorder()
            .record(&request(MovementKind::Decrease, f.product_id, None, 1), &f.actor)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);
        assert!(f.db.ledger().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_store_rolls_back() {
        let f = setup(10).await;
        let recorder = f.db.recorder();

        let err = recorder
            .record(
                &request(MovementKind::Decrease, f.product_id, Some(f.store_id + 10), 2),
                &f.actor,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);

        f.db.stores().set_status(f.store_id, Status::Inactive).await.unwrap();
        let err = recorder
            .record(
                &request(MovementKind::Decrease, f.product_id, Some(f.store_id), 2),
                &f.actor,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMovementContext);

        let product = f.db.products().get_by_id(f.product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 10);
        assert!(f.db.ledger().list_recent(10).await.unwrap().is_empty());
        assert!(recorder.list(PageRequest::default()).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_total_overflow_rejected() {
        let f = setup(10).await;

        let mut huge = request(MovementKind::Increase, f.product_id, None, 2);
        huge.unit_price_cents = i64::MAX;
        let err = f.db.recorder().record(&huge, &f.actor).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_reads_and_summary() {
        let f = setup(0).await;
        let recorder = f.db.recorder();

        recorder
            .record(&request(MovementKind::Increase, f.product_id, None, 10), &f.actor)
            .await
            .unwrap();
        recorder
            .record(
                &request(MovementKind::Decrease, f.product_id, Some(f.store_id), 3),
                &f.actor,
            )
            .await
            .unwrap();

        assert_eq!(recorder.list_by_product(f.product_id, 10).await.unwrap().len(), 2);
        assert_eq!(recorder.list_by_store(f.store_id, 10).await.unwrap().len(), 1);

        let summary = recorder.summary().await.unwrap();
        assert_eq!(summary.inbound.quantity, 10);
        assert_eq!(summary.outbound.quantity, 3);
        assert_eq!(summary.net(), Some(Money::from_cents(350 * 3 - 350 * 10)));

        let history = f.db.ledger().list_by_product(f.product_id, PageRequest::default()).await.unwrap();
        assert_eq!(history.total, 2);
        assert_eq!(history.items[0].stock_after, 7);
    }
}
