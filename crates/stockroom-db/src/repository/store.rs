//! # Store Repository
//!
//! Destination locations for outbound movements.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Status, Store};

/// Repository for stores.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    /// Creates a new StoreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Inserts a new ACTIVE store.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Code already taken
    pub async fn insert(&self, code: &str, name: &str) -> DbResult<Store> {
        debug!(code, "Inserting store");

        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (code, name, status, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, code, name, status, created_at
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(Status::Active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(store)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, code, name, status, created_at FROM stores WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Looks a store up inside the caller's unit of work.
    pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, code, name, status, created_at FROM stores WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(store)
    }

    /// All stores ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT id, code, name, status, created_at FROM stores ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Activates or deactivates a store. Inactive stores accept no movements.
    pub async fn set_status(&self, id: i64, status: Status) -> DbResult<()> {
        let result = sqlx::query("UPDATE stores SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        Ok(())
    }
}
