//! # Movement Repository
//!
//! Append and read directional movements, and aggregate them into a
//! valuation summary.
//!
//! Like the ledger, the movements table is append-only. Amounts are stored
//! in minor units and the schema rechecks
//! `total_amount_cents = unit_price_cents × quantity`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::clamp_limit;
use stockroom_core::{
    Money, Movement, MovementKind, NewMovement, Page, PageRequest, StockResult, ValuationSummary,
};

/// Repository for recorded movements.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends one movement inside the caller's unit of work.
    pub async fn append(conn: &mut SqliteConnection, movement: &NewMovement) -> DbResult<Movement> {
        debug!(
            product_id = movement.product_id,
            store_id = ?movement.store_id,
            kind = %movement.movement_kind,
            "Appending movement"
        );

        let appended = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements (
                movement_kind, product_id, store_id, quantity,
                unit_price_cents, total_amount_cents, notes,
                created_by, movement_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING
                id, movement_kind, product_id, store_id, quantity,
                unit_price_cents, total_amount_cents, notes,
                created_by, movement_date
            "#,
        )
        .bind(movement.movement_kind)
        .bind(movement.product_id)
        .bind(movement.store_id)
        .bind(movement.quantity)
        .bind(movement.unit_price.cents())
        .bind(movement.total_amount.cents())
        .bind(&movement.notes)
        .bind(movement.created_by)
        .bind(movement.movement_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(appended)
    }

    /// Latest movements of one product, newest first.
    pub async fn list_by_product(&self, product_id: i64, limit: i64) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, movement_kind, product_id, store_id, quantity,
                unit_price_cents, total_amount_cents, notes,
                created_by, movement_date
            FROM movements
            WHERE product_id = ?1
            ORDER BY movement_date DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Latest outbound movements delivered to one store, newest first.
    pub async fn list_by_store(&self, store_id: i64, limit: i64) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, movement_kind, product_id, store_id, quantity,
                unit_price_cents, total_amount_cents, notes,
                created_by, movement_date
            FROM movements
            WHERE store_id = ?1
            ORDER BY movement_date DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(store_id)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// All movements, paged, newest first.
    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Movement>> {
        let page = page.normalized();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movements")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, movement_kind, product_id, store_id, quantity,
                unit_price_cents, total_amount_cents, notes,
                created_by, movement_date
            FROM movements
            ORDER BY movement_date DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    /// Inbound and outbound totals plus outbound value per store.
    ///
    /// Grouped in SQL, folded by [`ValuationSummary::from_groups`]. Totals
    /// that overflow fail with a validation error, not a wrapped figure.
    pub async fn summary(&self) -> StockResult<ValuationSummary> {
        let rows: Vec<(MovementKind, Option<i64>, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                movement_kind,
                store_id,
                COUNT(*),
                COALESCE(SUM(quantity), 0),
                COALESCE(SUM(total_amount_cents), 0)
            FROM movements
            GROUP BY movement_kind, store_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let summary = ValuationSummary::from_groups(rows.into_iter().map(
            |(kind, store_id, count, quantity, amount)| {
                (kind, store_id, count, quantity, Money::from_cents(amount))
            },
        ))?;

        Ok(summary)
    }
}
