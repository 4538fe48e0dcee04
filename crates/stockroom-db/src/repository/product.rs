//! # Product Repository
//!
//! The stock-relevant catalog projection.
//!
//! ## Key Operations
//! - Register a product with its opening balance
//! - Lookup by id or SKU
//! - Activate / deactivate
//! - Low-stock listing
//!
//! Stock is never written here after insert. Every later change goes
//! through [`StockAdjuster`](crate::StockAdjuster) so that it leaves a
//! ledger entry.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::clamp_limit;
use stockroom_core::{NewProduct, Product, Status};

/// Repository for the product projection.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.insert(&NewProduct { sku: "COKE-330".into(), .. }).await?;
/// let same = repo.get_by_sku("COKE-330").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new ACTIVE product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted row with generated id
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::CheckViolation)` - Negative price or opening stock
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let now = Utc::now();

        let inserted = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, name, price_cents, stock, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, sku, name, price_cents, stock, status, created_at, updated_at
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.initial_stock)
        .bind(Status::Active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.sku.clone(),
            },
            other => other,
        })?;

        Ok(inserted)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, stock, status, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, stock, status, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Activates or deactivates a product.
    ///
    /// Inactive products reject every adjustment. A status change is a
    /// single write statement, so it serializes with any adjustment in
    /// flight on the same row.
    pub async fn set_status(&self, id: i64, status: Status) -> DbResult<()> {
        debug!(id, status = ?status, "Setting product status");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Active products at or below `threshold`, lowest stock first.
    pub async fn list_low_stock(&self, threshold: i64, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, stock, status, created_at, updated_at
            FROM products
            WHERE status = 'ACTIVE' AND stock <= ?1
            ORDER BY stock ASC, id ASC
            LIMIT ?2
            "#,
        )
        .bind(threshold)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = 'ACTIVE'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_product(sku: &str, stock: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            price_cents: 199,
            initial_stock: stock,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let inserted = repo.insert(&new_product("COKE-330", 24)).await.unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.stock, 24);
        assert_eq!(inserted.status, Status::Active);

        let by_id = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "COKE-330");

        let by_sku = repo.get_by_sku("COKE-330").await.unwrap().unwrap();
        assert_eq!(by_sku.id, inserted.id);

        assert!(repo.get_by_id(inserted.id + 100).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&new_product("DUP-1", 1)).await.unwrap();
        let err = repo.insert(&new_product("DUP-1", 1)).await.unwrap_err();

        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "DUP-1"),
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_negative_opening_stock_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.products().insert(&new_product("NEG", -5)).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_set_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let product = repo.insert(&new_product("OLD-1", 3)).await.unwrap();

        repo.set_status(product.id, Status::Inactive).await.unwrap();
        let reloaded = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, Status::Inactive);
        assert_eq!(reloaded.stock, 3);

        let err = repo.set_status(9999, Status::Active).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&new_product("A", 0)).await.unwrap();
        repo.insert(&new_product("B", 4)).await.unwrap();
        repo.insert(&new_product("C", 50)).await.unwrap();
        let hidden = repo.insert(&new_product("D", 1)).await.unwrap();
        repo.set_status(hidden.id, Status::Inactive).await.unwrap();

        let low = repo.list_low_stock(5, 10).await.unwrap();
        let skus: Vec<_> = low.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["A", "B"]);
    }
}
