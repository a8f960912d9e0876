//! Tests for per-type stat aggregation math and change detection

use rust_decimal::Decimal;
use shared::{
    compute_partition_totals, container_quantity, determine_status, ChangeSet, StockStatus,
    CONTAINER_MONITORED_FIELDS, LARGE_ITEM_MONITORED_FIELDS, PARTITION_MONITORED_FIELDS,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

mod partition_totals {
    use super::*;

    #[test]
    fn totals_follow_count_and_capacity() {
        let totals = compute_partition_totals(9, 1, 10);
        assert_eq!(totals.total_quantity, 9);
        assert_eq!(totals.total_capacity, 10);
        assert_eq!(totals.percent(), dec("90"));
    }

    #[test]
    fn percent_with_multiple_partitions() {
        let totals = compute_partition_totals(15, 3, 10);
        assert_eq!(totals.total_capacity, 30);
        assert_eq!(totals.percent(), dec("50"));
    }

    #[test]
    fn zero_partitions_have_zero_percent() {
        let totals = compute_partition_totals(0, 0, 10);
        assert_eq!(totals.total_capacity, 0);
        assert_eq!(totals.percent(), Decimal::ZERO);
    }

    #[test]
    fn nearly_full_partition_goes_high() {
        // One tray of capacity 10 holding 9 items is at 90%
        let totals = compute_partition_totals(9, 1, 10);
        let status = determine_status(totals.percent(), Some(dec("20")), Some(dec("80")));
        assert_eq!(status, Some(StockStatus::High));
    }

    #[test]
    fn nearly_empty_partition_goes_low() {
        let totals = compute_partition_totals(1, 1, 10);
        let status = determine_status(totals.percent(), Some(dec("20")), Some(dec("80")));
        assert_eq!(status, Some(StockStatus::Low));
    }
}

mod container_quantities {
    use super::*;

    #[test]
    fn quantity_is_weight_over_per_item_weight() {
        assert_eq!(container_quantity(dec("60"), Some(dec("2"))), Some(30));
    }

    #[test]
    fn quantity_rounds_half_to_even() {
        // 25 / 10 = 2.5 rounds to 2, 35 / 10 = 3.5 rounds to 4
        assert_eq!(container_quantity(dec("25"), Some(dec("10"))), Some(2));
        assert_eq!(container_quantity(dec("35"), Some(dec("10"))), Some(4));
    }

    #[test]
    fn missing_per_item_weight_yields_no_quantity() {
        assert_eq!(container_quantity(dec("60"), None), None);
    }

    #[test]
    fn non_positive_per_item_weight_yields_no_quantity() {
        assert_eq!(container_quantity(dec("60"), Some(Decimal::ZERO)), None);
        assert_eq!(container_quantity(dec("60"), Some(dec("-1"))), None);
    }

    #[test]
    fn weight_gain_crosses_into_high() {
        // Refilling a container from 20 to 60 with thresholds 10/50 moves
        // the item from MEDIUM to HIGH
        let low = Some(dec("10"));
        let high = Some(dec("50"));
        assert_eq!(
            determine_status(dec("20"), low, high),
            Some(StockStatus::Medium)
        );
        assert_eq!(
            determine_status(dec("60"), low, high),
            Some(StockStatus::High)
        );
    }
}

mod change_detection {
    use super::*;

    #[test]
    fn identical_values_produce_empty_change_set() {
        let mut changes = ChangeSet::new();
        changes.compare("total_quantity", &10i64, &10i64);
        changes.compare(
            "stock_status",
            &Some(StockStatus::Medium),
            &Some(StockStatus::Medium),
        );
        assert!(changes.is_empty());
        assert!(!changes.touches(PARTITION_MONITORED_FIELDS));
    }

    #[test]
    fn differing_values_are_recorded() {
        let mut changes = ChangeSet::new();
        changes.compare("total_quantity", &10i64, &12i64);
        changes.compare("total_capacity", &20i64, &20i64);
        assert_eq!(changes.fields(), &["total_quantity"]);
    }

    #[test]
    fn monitored_field_change_triggers_history() {
        let mut changes = ChangeSet::new();
        changes.compare("total_weight", &dec("20"), &dec("60"));
        assert!(changes.touches(CONTAINER_MONITORED_FIELDS));
        // The large item monitored set does not include weight
        assert!(!changes.touches(LARGE_ITEM_MONITORED_FIELDS));
    }

    #[test]
    fn status_flip_alone_triggers_history() {
        let mut changes = ChangeSet::new();
        changes.compare(
            "stock_status",
            &Some(StockStatus::Medium),
            &Some(StockStatus::High),
        );
        assert!(changes.touches(PARTITION_MONITORED_FIELDS));
        assert!(changes.touches(LARGE_ITEM_MONITORED_FIELDS));
        assert!(changes.touches(CONTAINER_MONITORED_FIELDS));
    }

    #[test]
    fn recomputation_is_idempotent() {
        // Comparing a recomputed value against itself the second time around
        // yields an empty change set, so no duplicate history is written
        let totals = compute_partition_totals(9, 1, 10);
        let status = determine_status(totals.percent(), Some(dec("20")), Some(dec("80")));

        let mut second_run = ChangeSet::new();
        second_run.compare("total_quantity", &totals.total_quantity, &totals.total_quantity);
        second_run.compare("total_capacity", &totals.total_capacity, &totals.total_capacity);
        second_run.compare("stock_status", &status, &status);
        assert!(second_run.is_empty());
    }
}
