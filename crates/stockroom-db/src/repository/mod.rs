//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Two Kinds of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-level (own their connection, one statement each)                 │
//! │  ├── ProductRepository   catalog projection, never writes stock        │
//! │  ├── LedgerRepository    list_by_product, list_recent                  │
//! │  ├── MovementRepository  list_*, summary                               │
//! │  ├── StoreRepository     insert, get                                   │
//! │  └── UserRepository      insert, get                                   │
//! │                                                                         │
//! │  Unit-of-work level (borrow the caller's transaction)                  │
//! │  ├── StockAccessor              lock_for_update, write_stock           │
//! │  ├── LedgerRepository::append   never opens its own transaction        │
//! │  ├── MovementRepository::append                                        │
//! │  └── StoreRepository::find_in                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither the ledger nor the movement repository exposes an update or a
//! delete.

pub mod ledger;
pub mod movement;
pub mod product;
pub mod stock;
pub mod store;
pub mod user;

use stockroom_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Clamps a caller-supplied row limit to `1..=MAX_PAGE_SIZE`.
///
/// Out-of-range values fall back to the default rather than erroring.
pub(crate) fn clamp_limit(limit: i64) -> i64 {
    if (1..=MAX_PAGE_SIZE).contains(&limit) {
        limit
    } else {
        DEFAULT_PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(5), 5);
        assert_eq!(clamp_limit(MAX_PAGE_SIZE), MAX_PAGE_SIZE);
        assert_eq!(clamp_limit(0), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(-3), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(MAX_PAGE_SIZE + 1), DEFAULT_PAGE_SIZE);
    }
}
