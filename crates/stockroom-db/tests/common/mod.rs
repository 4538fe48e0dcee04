//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use stockroom_core::{Actor, LedgerEntry, NewProduct, PageRequest, Role};
use stockroom_db::{Database, DbConfig};
use tempfile::TempDir;

/// A file-backed database with a real multi-connection pool.
///
/// The directory is removed when the fixture drops.
pub struct TestDb {
    pub db: Database,
    pub actor: Actor,
    _dir: TempDir,
}

pub async fn file_db(max_connections: u32, busy_timeout: Duration) -> TestDb {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::new(dir.path().join("stockroom.db"))
        .max_connections(max_connections)
        .busy_timeout(busy_timeout);

    let db = Database::new(config).await.unwrap();
    let user = db.users().insert("tester", "Test User", Role::Staff).await.unwrap();

    TestDb {
        db,
        actor: user.actor(),
        _dir: dir,
    }
}

pub async fn memory_db() -> (Database, Actor) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let user = db.users().insert("tester", "Test User", Role::Staff).await.unwrap();
    (db, user.actor())
}

pub async fn product(db: &Database, sku: &str, stock: i64) -> i64 {
    db.products()
        .insert(&NewProduct {
            sku: sku.to_string(),
            name: format!("Test {}", sku),
            price_cents: 100,
            initial_stock: stock,
        })
        .await
        .unwrap()
        .id
}

pub async fn stock_of(db: &Database, product_id: i64) -> i64 {
    db.products().get_by_id(product_id).await.unwrap().unwrap().stock
}

/// Every ledger entry of a product, oldest first.
pub async fn history(db: &Database, product_id: i64) -> Vec<LedgerEntry> {
    let mut entries = Vec::new();
    let mut page = 1;
    loop {
        let batch = db
            .ledger()
            .list_by_product(product_id, PageRequest::new(page, 100))
            .await
            .unwrap();
        let done = batch.items.len() < 100;
        entries.extend(batch.items);
        if done {
            break;
        }
        page += 1;
    }
    entries.reverse();
    entries
}

/// Asserts the entries form an unbroken before/after chain from `opening`
/// and returns the final stock they imply.
pub fn assert_chain(entries: &[LedgerEntry], opening: i64) -> i64 {
    let mut expected_before = opening;
    for entry in entries {
        assert!(entry.is_consistent(), "inconsistent entry {:?}", entry);
        assert_eq!(
            entry.stock_before, expected_before,
            "entry {} does not continue from the previous one",
            entry.id
        );
        expected_before = entry.stock_after;
    }
    expected_before
}
