//! Stock level math: threshold-derived status and per-type aggregate totals
//!
//! `determine_status` is the single source of truth for the HIGH/MEDIUM/LOW
//! classification. The stat aggregator in the backend computes totals with SQL
//! and delegates the derivation and change detection to this module.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tri-level stock classification relative to configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    High,
    Medium,
    Low,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::High => "high",
            StockStatus::Medium => "medium",
            StockStatus::Low => "low",
        }
    }
}

impl FromStr for StockStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(StockStatus::High),
            "medium" => Ok(StockStatus::Medium),
            "low" => Ok(StockStatus::Low),
            _ => Err("unknown stock status"),
        }
    }
}

/// Derive a stock status from a value and the configured thresholds.
///
/// Returns `None` when both thresholds are unset. Ties resolve to HIGH on the
/// upper bound (`>=`) and LOW on the lower bound (`<=`); anything strictly
/// between the two is MEDIUM.
pub fn determine_status(
    value: Decimal,
    low: Option<Decimal>,
    high: Option<Decimal>,
) -> Option<StockStatus> {
    let (low, high) = match (low, high) {
        (None, None) => return None,
        (l, h) => (l, h),
    };

    if let Some(high) = high {
        if value >= high {
            return Some(StockStatus::High);
        }
    }
    if let Some(low) = low {
        if value <= low {
            return Some(StockStatus::Low);
        }
    }
    Some(StockStatus::Medium)
}

/// Aggregate totals computed for a partition-type item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionTotals {
    pub total_quantity: i64,
    pub total_capacity: i64,
}

impl PartitionTotals {
    /// Fill percentage over total capacity, 0 when capacity is 0
    pub fn percent(&self) -> Decimal {
        if self.total_capacity == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.total_quantity) / Decimal::from(self.total_capacity)
            * Decimal::from(100)
    }
}

/// Compute partition totals from the sum of child quantities, the number of
/// partitions, and the configured per-partition capacity.
pub fn compute_partition_totals(
    quantity_sum: i64,
    partition_count: i64,
    partition_capacity: i64,
) -> PartitionTotals {
    PartitionTotals {
        total_quantity: quantity_sum,
        total_capacity: partition_count * partition_capacity,
    }
}

/// Derived container quantity: total contents weight divided by the configured
/// per-item weight, rounded to the nearest integer (banker's rounding, matching
/// the dashboard's display convention). `None` when the per-item weight is
/// unset or not positive.
pub fn container_quantity(
    total_weight: Decimal,
    container_item_weight: Option<Decimal>,
) -> Option<i64> {
    let per_item = container_item_weight?;
    if per_item <= Decimal::ZERO {
        return None;
    }
    (total_weight / per_item).round().to_i64()
}

/// Stat fields monitored by the history recorder, per item type
pub const PARTITION_MONITORED_FIELDS: &[&str] =
    &["total_quantity", "total_capacity", "stock_status"];
pub const LARGE_ITEM_MONITORED_FIELDS: &[&str] = &["total_quantity", "stock_status"];
pub const CONTAINER_MONITORED_FIELDS: &[&str] =
    &["total_weight", "total_quantity", "stock_status"];

/// Tracks which stat fields changed during a recomputation.
///
/// The aggregator records every field it compares; the history recorder only
/// snapshots when the change set intersects the monitored fields for the type.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    changed: Vec<&'static str>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field comparison; only differing values are kept
    pub fn compare<T: PartialEq>(&mut self, field: &'static str, old: &T, new: &T) {
        if old != new {
            self.changed.push(field);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.changed
    }

    /// True when at least one changed field is in the monitored set
    pub fn touches(&self, monitored: &[&str]) -> bool {
        self.changed.iter().any(|f| monitored.contains(f))
    }
}
