//! # Movement Valuation
//!
//! Aggregates recorded movements into the figures the reports page shows:
//! inbound and outbound totals, the net between them, and outbound value
//! per destination store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Movement, MovementKind};
use crate::validation::ValidationResult;

/// Count and value of movements in one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DirectionTotal {
    pub count: i64,
    pub quantity: i64,
    pub amount: Money,
}

/// Outbound value delivered to one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreTotal {
    pub store_id: i64,
    pub count: i64,
    pub amount: Money,
}

/// Valuation over a set of movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValuationSummary {
    pub inbound: DirectionTotal,
    pub outbound: DirectionTotal,
    /// Sorted by store id.
    pub by_store: Vec<StoreTotal>,
}

impl ValuationSummary {
    /// Folds pre-aggregated groups (one per kind and store) into a summary.
    ///
    /// Used by the database layer, which groups in SQL. Every total is
    /// accumulated with checked arithmetic; a figure that no longer fits
    /// fails with `OutOfRange` naming it.
    pub fn from_groups<I>(groups: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = (MovementKind, Option<i64>, i64, i64, Money)>,
    {
        let mut summary = ValuationSummary::default();
        let mut stores: BTreeMap<i64, StoreTotal> = BTreeMap::new();

        for (kind, store_id, count, quantity, amount) in groups {
            let bucket = match kind {
                MovementKind::Increase => &mut summary.inbound,
                MovementKind::Decrease => &mut summary.outbound,
                MovementKind::Adjustment => continue,
            };
            bucket.count = add_count(bucket.count, count)?;
            bucket.quantity = bucket
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| out_of_range("quantity"))?;
            bucket.amount = add_amount(bucket.amount, amount)?;

            if let (MovementKind::Decrease, Some(id)) = (kind, store_id) {
                let store = stores.entry(id).or_insert(StoreTotal {
                    store_id: id,
                    count: 0,
                    amount: Money::zero(),
                });
                store.count = add_count(store.count, count)?;
                store.amount = add_amount(store.amount, amount)?;
            }
        }

        summary.by_store = stores.into_values().collect();
        Ok(summary)
    }

    /// Summarizes individual movements.
    pub fn from_movements<'a, I>(movements: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = &'a Movement>,
    {
        Self::from_groups(movements.into_iter().map(|m| {
            (m.movement_kind, m.store_id, 1, m.quantity, m.total_amount())
        }))
    }

    /// Outbound value minus inbound value, `None` on overflow.
    pub fn net(&self) -> Option<Money> {
        self.outbound.amount.checked_sub(self.inbound.amount)
    }

    pub fn total_count(&self) -> Option<i64> {
        self.inbound.count.checked_add(self.outbound.count)
    }
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

fn add_count(total: i64, count: i64) -> ValidationResult<i64> {
    total.checked_add(count).ok_or_else(|| out_of_range("count"))
}

fn add_amount(total: Money, amount: Money) -> ValidationResult<Money> {
    total.checked_add(amount).ok_or_else(|| out_of_range("total_amount"))
}
