//! # Ledger Repository
//!
//! Append and read the stock ledger.
//!
//! ## Append Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StockAdjuster / MovementRecorder                                      │
//! │       │  (already holds the product lock)                              │
//! │       ▼                                                                 │
//! │  LedgerRepository::append(&mut tx, &entry)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO stock_ledger ... RETURNING *                              │
//! │       │                                                                 │
//! │       └─► commits or rolls back together with the stock write          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Append borrows the caller's connection and never opens a transaction of
//! its own. The table has triggers rejecting UPDATE and DELETE, and this
//! repository exposes neither.
//!
//! Reads are newest first: `created_at DESC, id DESC`. The id breaks ties
//! between entries written within the same clock tick.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::clamp_limit;
use stockroom_core::{LedgerEntry, NewLedgerEntry, Page, PageRequest};

/// Repository for ledger entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends one entry inside the caller's unit of work.
    ///
    /// ## Returns
    /// * `Ok(LedgerEntry)` - The persisted entry with its id
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown product or actor
    pub async fn append(conn: &mut SqliteConnection, entry: &NewLedgerEntry) -> DbResult<LedgerEntry> {
        debug!(
            product_id = entry.product_id,
            kind = %entry.movement_kind,
            quantity = entry.quantity,
            "Appending ledger entry"
        );

        let appended = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO stock_ledger (
                product_id, movement_kind, quantity,
                stock_before, stock_after, notes,
                created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING
                id, product_id, movement_kind, quantity,
                stock_before, stock_after, notes,
                created_by, created_at
            "#,
        )
        .bind(entry.product_id)
        .bind(entry.movement_kind)
        .bind(entry.quantity)
        .bind(entry.stock_before)
        .bind(entry.stock_after)
        .bind(&entry.notes)
        .bind(entry.created_by)
        .bind(entry.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(appended)
    }

    /// One page of a product's history, newest first, with the total count.
    ///
    /// An unknown product yields an empty page, not an error.
    pub async fn list_by_product(
        &self,
        product_id: i64,
        page: PageRequest,
    ) -> DbResult<Page<LedgerEntry>> {
        let page = page.normalized();

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_ledger WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id, product_id, movement_kind, quantity,
                stock_before, stock_after, notes,
                created_by, created_at
            FROM stock_ledger
            WHERE product_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(product_id)
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

    /// The most recent entries across all products.
    ///
    /// `limit` outside `1..=100` falls back to the default page size.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id, product_id, movement_kind, quantity,
                stock_before, stock_after, notes,
                created_by, created_at
            FROM stock_ledger
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use stockroom_core::{MovementKind, NewProduct, Role};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().insert("clerk", "Store Clerk", Role::Staff).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                sku: "RICE-5KG".to_string(),
                name: "Rice 5kg".to_string(),
                price_cents: 1250,
                initial_stock: 0,
            })
            .await
            .unwrap();
        (db, product.id, user.id)
    }

    fn entry(product_id: i64, user_id: i64, before: i64, qty: i64, minutes: i64) -> NewLedgerEntry {
        NewLedgerEntry {
            product_id,
            movement_kind: MovementKind::Increase,
            quantity: qty,
            stock_before: before,
            stock_after: before + qty,
            notes: Some(format!("receipt {}", minutes)),
            created_by: user_id,
            created_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn test_append_returns_persisted_entry() {
        let (db, product_id, user_id) = setup().await;

        let mut conn = db.pool().acquire().await.unwrap();
        let appended = LedgerRepository::append(&mut conn, &entry(product_id, user_id, 0, 4, 0))
            .await
            .unwrap();
        drop(conn);

        assert!(appended.id > 0);
        assert_eq!(appended.stock_after, 4);
        assert_eq!(appended.notes.as_deref(), Some("receipt 0"));
        assert!(appended.is_consistent());
    }

    #[tokio::test]
    async fn test_append_unknown_actor_rejected() {
        let (db, product_id, _) = setup().await;

        let mut conn = db.pool().acquire().await.unwrap();
        let err = LedgerRepository::append(&mut conn, &entry(product_id, 404, 0, 1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_by_product_pages_newest_first() {
        let (db, product_id, user_id) = setup().await;

        let mut conn = db.pool().acquire().await.unwrap();
        let mut stock = 0;
        for minute in 0..5 {
            LedgerRepository::append(&mut conn, &entry(product_id, user_id, stock, 2, minute))
                .await
                .unwrap();
            stock += 2;
        }
        drop(conn);

        let repo = db.ledger();
        let first = repo.list_by_product(product_id, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages(), 3);
        let afters: Vec<_> = first.items.iter().map(|e| e.stock_after).collect();
        assert_eq!(afters, vec![10, 8]);

        let last = repo.list_by_product(product_id, PageRequest::new(3, 2)).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].stock_after, 2);

        let none = repo.list_by_product(product_id + 1, PageRequest::default()).await.unwrap();
        assert_eq!(none.total, 0);
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_product_normalizes_page() {
        let (db, product_id, _) = setup().await;

        let page = db
            .ledger()
            .list_by_product(product_id, PageRequest { page: 0, page_size: 1000 })
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, stockroom_core::DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_list_recent_clamps_limit() {
        let (db, product_id, user_id) = setup().await;

        let mut conn = db.pool().acquire().await.unwrap();
        for minute in 0..3 {
            LedgerRepository::append(&mut conn, &entry(product_id, user_id, minute, 1, minute))
                .await
                .unwrap();
        }
        drop(conn);

        let two = db.ledger().list_recent(2).await.unwrap();
        assert_eq!(two.len(), 2);
        assert!(two[0].created_at >= two[1].created_at);

        let all = db.ledger().list_recent(0).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_ledger_rejects_update_and_delete() {
        let (db, product_id, user_id) = setup().await;

        let mut conn = db.pool().acquire().await.unwrap();
        let appended = LedgerRepository::append(&mut conn, &entry(product_id, user_id, 0, 1, 0))
            .await
            .unwrap();

        let update = sqlx::query("UPDATE stock_ledger SET quantity = 99 WHERE id = ?1")
            .bind(appended.id)
            .execute(&mut *conn)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM stock_ledger WHERE id = ?1")
            .bind(appended.id)
            .execute(&mut *conn)
            .await;
        assert!(delete.is_err());
        drop(conn);

        let recent = db.ledger().list_recent(10).await.unwrap();
        assert_eq!(recent, vec![appended]);
    }
}
