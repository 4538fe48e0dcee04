//! # stockroom-core: Pure Inventory Ledger Logic
//!
//! Domain types and the rules of the stock adjustment engine, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Back-office API (routing, auth, catalog CRUD)            │   │
//! │  │    POST /stock/increase, POST /stock/decrease, GET /ledger      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Actor + typed request                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockroom-db (engine + repositories)              │   │
//! │  │         transactions, row lock, ledger append, reads            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐   │   │
//! │  │   │   types   │  │   money   │  │ adjustment │  │validation│   │   │
//! │  │   │ LedgerEnt │  │   Money   │  │    plan    │  │  rules   │   │   │
//! │  │   │ Movement  │  │           │  │ StockChange│  │          │   │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Products, ledger entries, movements, requests, paging
//! - [`money`] - Integer minor-unit money
//! - [`adjustment`] - The locked-snapshot decision (`plan`)
//! - [`validation`] - Checks run before any unit of work opens
//! - [`valuation`] - Movement totals for reporting
//! - [`error`] - `StockError` taxonomy and stable `ErrorKind` codes
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::adjustment::plan;
//! use stockroom_core::{MovementKind, Status, StockSnapshot};
//!
//! let locked = StockSnapshot { id: 1, stock: 10, status: Status::Active };
//! let change = plan(&locked, MovementKind::Increase, 5).unwrap();
//! assert_eq!((change.stock_before, change.stock_after), (10, 15));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjustment;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod valuation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use adjustment::StockChange;
pub use error::{ErrorKind, StockError, StockResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use valuation::ValuationSummary;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of free-text notes on a movement.
pub const MAX_NOTES_LEN: usize = 500;

/// Page size used when the caller's is missing or out of range.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a ledger read will return.
pub const MAX_PAGE_SIZE: i64 = 100;
