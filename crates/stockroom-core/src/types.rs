//! # Domain Types
//!
//! Types shared by the adjustment engine, the ledger and the presentation
//! layer.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  LedgerEntry    │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  product_id     │   │  product_id     │       │
//! │  │  stock (>= 0)   │   │  movement_kind  │   │  store_id (opt) │       │
//! │  │  status         │   │  before / after │   │  unit × qty     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StockSnapshot  │   │  MovementKind   │   │     Actor       │       │
//! │  │  (locked read)  │   │  INCREASE       │   │  id, role       │       │
//! │  │  id/stock/status│   │  DECREASE       │   │  (resolved      │       │
//! │  └─────────────────┘   │  ADJUSTMENT     │   │   upstream)     │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ledger entries and movements are immutable once written; there is no
//! update type for either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Status
// =============================================================================

/// Lifecycle status shared by products and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Goods received; stock goes up.
    Increase,
    /// Goods withdrawn; stock goes down and must stay non-negative.
    Decrease,
    /// Reserved for stock-take corrections. The engine never produces it.
    Adjustment,
}

impl MovementKind {
    /// Stable text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Increase => "INCREASE",
            MovementKind::Decrease => "DECREASE",
            MovementKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
}

/// The principal causing a movement.
///
/// Authentication and authorization happen upstream; the engine only
/// records `id` on every ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Actor { id, role }
    }
}

/// A back-office user, as referenced by `created_by` columns.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The actor this user acts as.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Stock-relevant projection of a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub name: String,

    /// List price in minor units.
    pub price_cents: i64,

    /// Quantity on hand. Never negative in any committed state.
    pub stock: i64,

    pub status: Status,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields needed to register a product in the catalog projection.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    /// Opening balance. Later changes go through the adjustment engine.
    pub initial_stock: i64,
}

/// The row as read under the exclusive lock.
///
/// Only ever produced inside a unit of work; never cached across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub id: i64,
    pub stock: i64,
    pub status: Status,
}

// =============================================================================
// Store
// =============================================================================

/// A destination location for outbound movements.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub status: Status,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One committed stock change with its before/after snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: i64,
    pub product_id: i64,
    pub movement_kind: MovementKind,
    /// Magnitude moved, always > 0.
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub notes: Option<String>,
    /// Actor id.
    pub created_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Checks `stock_after = stock_before ± quantity` for this entry's kind.
    pub fn is_consistent(&self) -> bool {
        let expected = match self.movement_kind {
            MovementKind::Increase => self.stock_before.checked_add(self.quantity),
            MovementKind::Decrease => self.stock_before.checked_sub(self.quantity),
            MovementKind::Adjustment => return self.stock_after >= 0,
        };
        self.quantity > 0 && self.stock_after >= 0 && expected == Some(self.stock_after)
    }
}

/// A ledger entry before it has been appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub product_id: i64,
    pub movement_kind: MovementKind,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub notes: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Movement
// =============================================================================

/// A directional stock movement with valuation.
///
/// Outbound (`DECREASE`) movements always carry a destination store;
/// inbound (`INCREASE`) movements never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: i64,
    pub movement_kind: MovementKind,
    pub product_id: i64,
    pub store_id: Option<i64>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Always `unit_price_cents × quantity`, computed server-side.
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub created_by: i64,
    #[ts(as = "String")]
    pub movement_date: DateTime<Utc>,
}

impl Movement {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A movement before it has been appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub movement_kind: MovementKind,
    pub product_id: i64,
    pub store_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_by: i64,
    pub movement_date: DateTime<Utc>,
}

// =============================================================================
// Requests & Results
// =============================================================================

/// Input for `increase` / `decrease`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdjustStockRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AdjustStockRequest {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        AdjustStockRequest {
            product_id,
            quantity,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Input for the movement recorder.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordMovementRequest {
    pub movement_kind: MovementKind,
    pub product_id: i64,
    /// Destination; required for DECREASE, forbidden for INCREASE.
    #[serde(default)]
    pub store_id: Option<i64>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecordMovementRequest {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Committed outcome of an adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product: Product,
    pub entry: LedgerEntry,
}

/// Committed outcome of a recorded movement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordedMovement {
    pub movement: Movement,
    pub entry: LedgerEntry,
}

// =============================================================================
// Paging
// =============================================================================

/// 1-based page request.
///
/// Out-of-range values fall back to defaults instead of failing: page < 1
/// becomes 1, a size outside `1..=MAX_PAGE_SIZE` becomes `DEFAULT_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        PageRequest { page, page_size }.normalized()
    }

    /// Applies the fallback rules.
    pub fn normalized(self) -> Self {
        let page = if self.page < 1 { 1 } else { self.page };
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            self.page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        PageRequest { page, page_size }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: MovementKind, quantity: i64, before: i64, after: i64) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            product_id: 1,
            movement_kind: kind,
            quantity,
            stock_before: before,
            stock_after: after,
            notes: None,
            created_by: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ledger_entry_consistency() {
        assert!(entry(MovementKind::Increase, 5, 10, 15).is_consistent());
        assert!(entry(MovementKind::Decrease, 10, 10, 0).is_consistent());

        assert!(!entry(MovementKind::Increase, 5, 10, 14).is_consistent());
        assert!(!entry(MovementKind::Decrease, 11, 10, -1).is_consistent());
        assert!(!entry(MovementKind::Increase, 0, 10, 10).is_consistent());
    }

    #[test]
    fn test_page_request_fallbacks() {
        assert_eq!(PageRequest::new(0, 20), PageRequest { page: 1, page_size: 20 });
        assert_eq!(PageRequest::new(3, 0).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 101).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 100).page_size, 100);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let page: Page<i64> = Page {
            items: vec![],
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.total_pages(), 3);

        let empty: Page<i64> = Page {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 20,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_status_and_kind_serialization() {
        assert_eq!(serde_json::to_string(&Status::Inactive).unwrap(), "\"INACTIVE\"");
        assert_eq!(
            serde_json::from_str::<MovementKind>("\"DECREASE\"").unwrap(),
            MovementKind::Decrease
        );
        assert_eq!(MovementKind::Increase.to_string(), "INCREASE");
    }

    #[test]
    fn test_adjust_request_notes_default() {
        let req: AdjustStockRequest =
            serde_json::from_str(r#"{"product_id": 4, "quantity": 2}"#).unwrap();
        assert_eq!(req.notes, None);
        assert_eq!(req.quantity, 2);
    }
}
