//! Tests for history period bucketing and last-known-value replay

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    aggregate_item_series, aggregate_status_counts, period_boundaries, Granularity,
    HistorySnapshot, StockStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap().and_utc()
}

fn snapshot(item_id: &str, recorded_at: DateTime<Utc>, status: StockStatus) -> HistorySnapshot {
    HistorySnapshot {
        item_id: item_id.to_string(),
        recorded_at,
        stock_status: Some(status),
        total_quantity: Some(5),
        total_capacity: Some(10),
        total_weight: None,
    }
}

mod period_bucketing {
    use super::*;

    #[test]
    fn day_periods_enumerate_each_day() {
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 3), Granularity::Day).unwrap();
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2026-01-01", "2026-01-02", "2026-01-03"]);
        assert_eq!(periods[1].end_date, date(2026, 1, 2));
    }

    #[test]
    fn month_periods_end_on_last_day_of_month() {
        let periods =
            period_boundaries(date(2026, 1, 15), date(2026, 3, 10), Granularity::Month).unwrap();
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2026-01", "2026-02", "2026-03"]);
        assert_eq!(periods[0].end_date, date(2026, 1, 31));
        assert_eq!(periods[1].end_date, date(2026, 2, 28));
        // Final partial month is capped at the requested end
        assert_eq!(periods[2].end_date, date(2026, 3, 10));
    }

    #[test]
    fn year_periods_cap_at_requested_end() {
        let periods =
            period_boundaries(date(2024, 6, 1), date(2026, 2, 1), Granularity::Year).unwrap();
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2024", "2025", "2026"]);
        assert_eq!(periods[0].end_date, date(2024, 12, 31));
        assert_eq!(periods[2].end_date, date(2026, 2, 1));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = period_boundaries(date(2026, 2, 1), date(2026, 1, 1), Granularity::Day)
            .unwrap_err();
        assert_eq!(err, "end date must not be before start date");
    }

    #[test]
    fn single_day_range_has_one_period() {
        let periods =
            period_boundaries(date(2026, 5, 5), date(2026, 5, 5), Granularity::Day).unwrap();
        assert_eq!(periods.len(), 1);
    }

    #[test]
    fn cutoff_is_end_of_day() {
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 1), Granularity::Day).unwrap();
        let cutoff = periods[0].cutoff();
        assert!(cutoff > ts(2026, 1, 1, 23));
        assert!(cutoff < ts(2026, 1, 2, 0));
    }

    #[test]
    fn granularity_parses_known_values_only() {
        assert_eq!(Granularity::from_str("day").unwrap(), Granularity::Day);
        assert_eq!(Granularity::from_str("month").unwrap(), Granularity::Month);
        assert_eq!(Granularity::from_str("year").unwrap(), Granularity::Year);
        assert!(Granularity::from_str("week").is_err());
    }
}

mod fleet_replay {
    use super::*;

    #[test]
    fn last_known_status_carries_forward() {
        // Item goes LOW on Jan 1 and HIGH on Jan 2; on Jan 3 it still counts
        // as HIGH even though nothing was recorded that day
        let snapshots = vec![
            snapshot("bolt-m3", ts(2026, 1, 1, 9), StockStatus::Low),
            snapshot("bolt-m3", ts(2026, 1, 2, 9), StockStatus::High),
        ];
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 3), Granularity::Day).unwrap();

        let counts = aggregate_status_counts(&snapshots, &periods);
        assert_eq!(counts.len(), 3);
        assert_eq!((counts[0].low, counts[0].high), (1, 0));
        assert_eq!((counts[1].low, counts[1].high), (0, 1));
        assert_eq!((counts[2].low, counts[2].high), (0, 1));
    }

    #[test]
    fn items_are_counted_independently() {
        let snapshots = vec![
            snapshot("bolt-m3", ts(2026, 1, 1, 9), StockStatus::Low),
            snapshot("washer-8", ts(2026, 1, 1, 10), StockStatus::Medium),
            snapshot("bolt-m3", ts(2026, 1, 2, 9), StockStatus::Medium),
        ];
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 2), Granularity::Day).unwrap();

        let counts = aggregate_status_counts(&snapshots, &periods);
        assert_eq!(counts[0].low, 1);
        assert_eq!(counts[0].medium, 1);
        assert_eq!(counts[1].medium, 2);
    }

    #[test]
    fn all_buckets_present_even_when_empty() {
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 1), Granularity::Day).unwrap();
        let counts = aggregate_status_counts(&[], &periods);
        assert_eq!(counts.len(), 1);
        assert_eq!((counts[0].high, counts[0].medium, counts[0].low), (0, 0, 0));
    }

    #[test]
    fn same_day_snapshots_use_the_latest() {
        let snapshots = vec![
            snapshot("bolt-m3", ts(2026, 1, 1, 9), StockStatus::Low),
            snapshot("bolt-m3", ts(2026, 1, 1, 17), StockStatus::High),
        ];
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 1), Granularity::Day).unwrap();

        let counts = aggregate_status_counts(&snapshots, &periods);
        assert_eq!((counts[0].low, counts[0].high), (0, 1));
    }
}

mod item_replay {
    use super::*;

    #[test]
    fn periods_before_first_snapshot_are_omitted() {
        let snapshots = vec![snapshot("bolt-m3", ts(2026, 1, 2, 9), StockStatus::Medium)];
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 3), Granularity::Day).unwrap();

        let series = aggregate_item_series(&snapshots, &periods);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, "2026-01-02");
        assert_eq!(series[1].period, "2026-01-03");
    }

    #[test]
    fn values_carry_forward_between_snapshots() {
        let mut early = snapshot("drum-oil", ts(2026, 1, 1, 9), StockStatus::Medium);
        early.total_quantity = None;
        early.total_capacity = None;
        early.total_weight = Some(Decimal::from(20));

        let mut late = early.clone();
        late.recorded_at = ts(2026, 1, 3, 9);
        late.stock_status = Some(StockStatus::High);
        late.total_weight = Some(Decimal::from(60));

        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 3), Granularity::Day).unwrap();
        let series = aggregate_item_series(&[early, late], &periods);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].total_weight, Some(Decimal::from(20)));
        assert_eq!(series[1].total_weight, Some(Decimal::from(20)));
        assert_eq!(series[1].stock_status, Some(StockStatus::Medium));
        assert_eq!(series[2].total_weight, Some(Decimal::from(60)));
        assert_eq!(series[2].stock_status, Some(StockStatus::High));
    }

    #[test]
    fn empty_history_yields_empty_series() {
        let periods =
            period_boundaries(date(2026, 1, 1), date(2026, 1, 3), Granularity::Day).unwrap();
        assert!(aggregate_item_series(&[], &periods).is_empty());
    }
}
