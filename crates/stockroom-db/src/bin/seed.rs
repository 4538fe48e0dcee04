//! # Seed Data Generator
//!
//! Populates a development database with users, stores, products and a
//! short movement history, then prints the valuation summary.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom.db (or $STOCKROOM_DB_PATH)
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Log verbosity follows `RUST_LOG`, e.g. `RUST_LOG=stockroom_db=debug`.

use std::env;

use stockroom_core::{
    AdjustStockRequest, MovementKind, NewProduct, RecordMovementRequest, Role,
};
use stockroom_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (sku, name, price_cents, opening stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("BEV-COLA-330", "Cola 330ml", 120, 48),
    ("BEV-WATER-500", "Mineral Water 500ml", 60, 120),
    ("GRO-RICE-5KG", "Basmati Rice 5kg", 1450, 20),
    ("GRO-OIL-1L", "Sunflower Oil 1L", 520, 36),
    ("DRY-MILK-1L", "Whole Milk 1L", 210, 24),
    ("SNK-CHIPS-90", "Salted Chips 90g", 95, 60),
];

/// (code, name)
const STORES: &[(&str, &str)] = &[
    ("NORTH", "North Branch"),
    ("SOUTH", "South Branch"),
    ("AIRPORT", "Airport Kiosk"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn")),
        )
        .init();

    let mut config = DbConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKROOM_DB_PATH or ./stockroom.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = db.users().insert("admin", "Warehouse Admin", Role::Admin).await?;
    let clerk = db.users().insert("clerk", "Stock Clerk", Role::Staff).await?;

    let mut store_ids = Vec::with_capacity(STORES.len());
    for (code, name) in STORES {
        store_ids.push(db.stores().insert(code, name).await?.id);
    }
    println!("✓ Created {} users and {} stores", 2, store_ids.len());

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (sku, name, price_cents, stock) in PRODUCTS {
        let product = db
            .products()
            .insert(&NewProduct {
                sku: sku.to_string(),
                name: name.to_string(),
                price_cents: *price_cents,
                initial_stock: *stock,
            })
            .await?;
        product_ids.push((product.id, *price_cents));
    }
    println!("✓ Created {} products", product_ids.len());

    // A receipt and two deliveries per product, rotating through the stores.
    let recorder = db.recorder();
    for (idx, (product_id, price_cents)) in product_ids.iter().enumerate() {
        recorder
            .record(
                &RecordMovementRequest {
                    movement_kind: MovementKind::Increase,
                    product_id: *product_id,
                    store_id: None,
                    quantity: 12,
                    unit_price_cents: price_cents * 7 / 10,
                    notes: Some("supplier delivery".to_string()),
                },
                &admin.actor(),
            )
            .await?;

        for offset in 0..2 {
            let store_id = store_ids[(idx + offset) % store_ids.len()];
            recorder
                .record(
                    &RecordMovementRequest {
                        movement_kind: MovementKind::Decrease,
                        product_id: *product_id,
                        store_id: Some(store_id),
                        quantity: 3 + offset as i64,
                        unit_price_cents: *price_cents,
                        notes: None,
                    },
                    &clerk.actor(),
                )
                .await?;
        }
    }

    // One shrinkage write-off without valuation.
    if let Some((product_id, _)) = product_ids.first() {
        db.adjuster()
            .decrease(
                &AdjustStockRequest::new(*product_id, 1).with_notes("damaged in storage"),
                &clerk.actor(),
            )
            .await?;
    }

    let summary = recorder.summary().await?;
    println!();
    println!("Valuation summary:");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let low = db.products().list_low_stock(20, 10).await?;
    println!();
    println!("Low stock (≤ 20): {}", low.len());
    for product in &low {
        println!("  {:<16} {:>4}", product.sku, product.stock);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
