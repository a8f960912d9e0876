//! Stat history aggregation: period bucketing and last-known-value replay
//!
//! The backend fetches raw `item_stat_history` snapshots ordered by timestamp
//! and hands them to these functions, which walk the requested period
//! boundaries and pick, for each boundary, the most recent snapshot at or
//! before it.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::stock::StockStatus;

/// Bucket size for history replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl FromStr for Granularity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err("unsupported granularity, expected day, month or year"),
        }
    }
}

/// One period in the replay: a display label and the last calendar day it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBoundary {
    pub label: String,
    pub end_date: NaiveDate,
}

impl PeriodBoundary {
    /// Cutoff instant for "latest snapshot at or before this period"
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.end_date
            .and_time(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap())
            .and_utc()
    }
}

/// Enumerate period boundaries between `start` and `end` inclusive.
///
/// Day periods end on the day itself; month and year periods end on the last
/// day of the month/year (capped at `end` for the final partial period).
/// Fails when `end < start`.
pub fn period_boundaries(
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Result<Vec<PeriodBoundary>, &'static str> {
    if end < start {
        return Err("end date must not be before start date");
    }

    let mut periods = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let (label, period_end, next) = match granularity {
            Granularity::Day => (
                cursor.format("%Y-%m-%d").to_string(),
                cursor,
                cursor + Days::new(1),
            ),
            Granularity::Month => {
                let first_of_month = cursor.with_day(1).unwrap();
                let next = first_of_month + Months::new(1);
                (
                    cursor.format("%Y-%m").to_string(),
                    (next - Days::new(1)).min(end),
                    next,
                )
            }
            Granularity::Year => {
                let next = NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1).unwrap();
                (
                    cursor.format("%Y").to_string(),
                    (next - Days::new(1)).min(end),
                    next,
                )
            }
        };
        periods.push(PeriodBoundary {
            label,
            end_date: period_end,
        });
        cursor = next;
    }

    Ok(periods)
}

/// A stat history snapshot, reduced to what the aggregation needs
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub item_id: String,
    pub recorded_at: DateTime<Utc>,
    pub stock_status: Option<StockStatus>,
    pub total_quantity: Option<i64>,
    pub total_capacity: Option<i64>,
    pub total_weight: Option<Decimal>,
}

/// Item counts per stock status for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStatusCounts {
    pub period: String,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl PeriodStatusCounts {
    fn zeroed(period: String) -> Self {
        Self {
            period,
            high: 0,
            medium: 0,
            low: 0,
        }
    }

    fn bump(&mut self, status: StockStatus) {
        match status {
            StockStatus::High => self.high += 1,
            StockStatus::Medium => self.medium += 1,
            StockStatus::Low => self.low += 1,
        }
    }
}

/// Fleet-wide replay: for each period, count items by their last-known stock
/// status at the period boundary. All three buckets are always present.
///
/// Snapshots must be ordered by `recorded_at` ascending; later snapshots for
/// the same item override earlier ones within the cutoff.
pub fn aggregate_status_counts(
    snapshots: &[HistorySnapshot],
    periods: &[PeriodBoundary],
) -> Vec<PeriodStatusCounts> {
    let mut results = Vec::with_capacity(periods.len());
    let mut latest: HashMap<&str, Option<StockStatus>> = HashMap::new();
    let mut idx = 0;

    for period in periods {
        let cutoff = period.cutoff();
        while idx < snapshots.len() && snapshots[idx].recorded_at <= cutoff {
            latest.insert(
                snapshots[idx].item_id.as_str(),
                snapshots[idx].stock_status,
            );
            idx += 1;
        }

        let mut counts = PeriodStatusCounts::zeroed(period.label.clone());
        for status in latest.values().flatten() {
            counts.bump(*status);
        }
        results.push(counts);
    }

    results
}

/// One period entry in a single item's replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPeriodStatus {
    pub period: String,
    pub stock_status: Option<StockStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<Decimal>,
}

/// Per-item replay: last-known snapshot per period for one item.
///
/// Periods before the item's first snapshot are omitted rather than
/// zero-filled; the item did not exist yet. Snapshots must be ordered by
/// `recorded_at` ascending and belong to a single item.
pub fn aggregate_item_series(
    snapshots: &[HistorySnapshot],
    periods: &[PeriodBoundary],
) -> Vec<ItemPeriodStatus> {
    let mut results = Vec::new();
    let mut current: Option<&HistorySnapshot> = None;
    let mut idx = 0;

    for period in periods {
        let cutoff = period.cutoff();
        while idx < snapshots.len() && snapshots[idx].recorded_at <= cutoff {
            current = Some(&snapshots[idx]);
            idx += 1;
        }

        if let Some(snapshot) = current {
            results.push(ItemPeriodStatus {
                period: period.label.clone(),
                stock_status: snapshot.stock_status,
                total_quantity: snapshot.total_quantity,
                total_capacity: snapshot.total_capacity,
                total_weight: snapshot.total_weight,
            });
        }
    }

    results
}
