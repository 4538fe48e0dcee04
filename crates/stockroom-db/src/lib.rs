//! # stockroom-db: Store of Record for Stockroom
//!
//! Persistence, row locking, the adjustment engine and the append-only
//! ledger. Uses SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Handler (HTTP, CLI, job) with an authenticated Actor                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Engine     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine/)    │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ StockAdjuster │───►│ StockAccessor │    │ 0001_initial │  │   │
//! │  │   │ Movement-     │    │ LedgerRepo    │    │              │  │   │
//! │  │   │   Recorder    │    │ MovementRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            │                    │                               │   │
//! │  │            └──── Database (pool.rs) ────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                SQLite (WAL, foreign keys on)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool and lock-wait configuration, env loading
//! - [`pool`] - The [`Database`] handle
//! - [`engine`] - Stock adjuster and movement recorder
//! - [`repository`] - Products, ledger, movements, stores, users
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::AdjustStockRequest;
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let done = db
//!     .adjuster()
//!     .increase(&AdjustStockRequest::new(product_id, 5), &actor)
//!     .await?;
//!
//! let history = db.ledger().list_by_product(product_id, Default::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use engine::{MovementRecorder, StockAdjuster};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockAccessor;
pub use repository::store::StoreRepository;
pub use repository::user::UserRepository;
