//! # Stock Accessor
//!
//! Locked read and write of a product's authoritative stock, scoped to one
//! unit of work.
//!
//! ## Exclusive Access in SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Other engines:   SELECT stock, status FROM products                   │
//! │                   WHERE id = ? FOR UPDATE                              │
//! │                                                                         │
//! │  SQLite has no FOR UPDATE. A no-op write takes the write lock and      │
//! │  returns the row in the same statement:                                │
//! │                                                                         │
//! │     UPDATE products SET stock = stock WHERE id = ?                     │
//! │     RETURNING id, stock, status                                        │
//! │                                                                         │
//! │  • Must be the FIRST statement of the transaction. A write that        │
//! │    follows a read has to upgrade its lock, and SQLite fails such       │
//! │    upgrades with SQLITE_BUSY instead of waiting.                       │
//! │  • A competing adjuster waits up to busy_timeout, then gets a          │
//! │    retryable DbError::Busy.                                            │
//! │  • The returned row is read under the lock, never from a stale base.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite's write lock covers the whole database, which is stricter than a
//! row lock; adjustments of different products serialize too, but readers
//! are never blocked.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Product, StockSnapshot};

/// Stock reads and writes bound to a caller-owned transaction.
///
/// ## Usage
/// ```rust,ignore
/// let mut tx = pool.begin().await?;
/// let mut stock = StockAccessor::new(&mut tx);
/// let snapshot = stock.lock_for_update(product_id).await?;
/// stock.write_stock(product_id, 15, Utc::now()).await?;
/// tx.commit().await?;
/// ```
pub struct StockAccessor<'t> {
    conn: &'t mut SqliteConnection,
}

impl<'t> StockAccessor<'t> {
    pub fn new(conn: &'t mut SqliteConnection) -> Self {
        StockAccessor { conn }
    }

    /// Acquires exclusive access to the product row and reads it.
    ///
    /// ## Returns
    /// * `Ok(Some(snapshot))` - Row locked until the transaction ends
    /// * `Ok(None)` - No such product
    /// * `Err(DbError::Busy)` - Lock not acquired within busy_timeout
    pub async fn lock_for_update(&mut self, product_id: i64) -> DbResult<Option<StockSnapshot>> {
        debug!(product_id, "Locking product row");

        let snapshot = sqlx::query_as::<_, StockSnapshot>(
            r#"
            UPDATE products
            SET stock = stock
            WHERE id = ?1
            RETURNING id, stock, status
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(snapshot)
    }

    /// Persists a new stock value for a locked product.
    pub async fn write_stock(
        &mut self,
        product_id: i64,
        new_stock: i64,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(product_id, new_stock, "Writing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(new_stock)
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Reads the full product projection inside the unit of work.
    pub async fn product(&mut self, product_id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, stock, status, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))
    }
}
