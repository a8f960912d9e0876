//! Tests for threshold-derived stock status
//!
//! The classification must be a pure function of value and thresholds, with
//! ties resolving to HIGH on the upper bound and LOW on the lower one.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{determine_status, StockStatus};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

mod threshold_classification {
    use super::*;

    #[test]
    fn value_at_high_threshold_is_high() {
        let status = determine_status(dec("50"), Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::High));
    }

    #[test]
    fn value_above_high_threshold_is_high() {
        let status = determine_status(dec("120"), Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::High));
    }

    #[test]
    fn value_at_low_threshold_is_low() {
        let status = determine_status(dec("10"), Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::Low));
    }

    #[test]
    fn value_below_low_threshold_is_low() {
        let status = determine_status(dec("3"), Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::Low));
    }

    #[test]
    fn value_between_thresholds_is_medium() {
        let status = determine_status(dec("30"), Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::Medium));
    }

    #[test]
    fn no_thresholds_means_no_status() {
        assert_eq!(determine_status(dec("30"), None, None), None);
    }

    #[test]
    fn high_check_wins_before_low_check() {
        // Degenerate configuration where the bands overlap: the upper bound
        // is evaluated first
        let status = determine_status(dec("50"), Some(dec("50")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::High));
    }

    #[test]
    fn only_high_threshold_set() {
        assert_eq!(
            determine_status(dec("60"), None, Some(dec("50"))),
            Some(StockStatus::High)
        );
        assert_eq!(
            determine_status(dec("40"), None, Some(dec("50"))),
            Some(StockStatus::Medium)
        );
    }

    #[test]
    fn only_low_threshold_set() {
        assert_eq!(
            determine_status(dec("5"), Some(dec("10")), None),
            Some(StockStatus::Low)
        );
        assert_eq!(
            determine_status(dec("15"), Some(dec("10")), None),
            Some(StockStatus::Medium)
        );
    }

    #[test]
    fn zero_value_with_thresholds_is_low() {
        let status = determine_status(Decimal::ZERO, Some(dec("10")), Some(dec("50")));
        assert_eq!(status, Some(StockStatus::Low));
    }
}

proptest! {
    /// The same inputs always produce the same classification
    #[test]
    fn prop_status_is_deterministic(value in -1000i64..1000, low in 0i64..500, span in 1i64..500) {
        let value = Decimal::from(value);
        let low = Decimal::from(low);
        let high = low + Decimal::from(span);

        let first = determine_status(value, Some(low), Some(high));
        let second = determine_status(value, Some(low), Some(high));
        prop_assert_eq!(first, second);
    }

    /// With both thresholds set a status always exists, and the bands
    /// partition the value axis
    #[test]
    fn prop_bands_cover_all_values(value in -1000i64..1000, low in 0i64..500, span in 1i64..500) {
        let value = Decimal::from(value);
        let low = Decimal::from(low);
        let high = low + Decimal::from(span);

        let status = determine_status(value, Some(low), Some(high));
        match status {
            Some(StockStatus::High) => prop_assert!(value >= high),
            Some(StockStatus::Low) => prop_assert!(value <= low && value < high),
            Some(StockStatus::Medium) => prop_assert!(value > low && value < high),
            None => prop_assert!(false, "status missing despite thresholds"),
        }
    }
}
