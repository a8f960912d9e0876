//! Tests for input validation rules

use rust_decimal::Decimal;
use shared::{
    validate_location_component, validate_percent_thresholds, validate_quantity,
    validate_thresholds, validate_total_units, validate_weight, Pagination, PaginationMeta,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

mod thresholds {
    use super::*;

    #[test]
    fn both_unset_is_valid() {
        assert!(validate_thresholds(None, None).is_ok());
    }

    #[test]
    fn one_sided_pair_is_rejected() {
        assert!(validate_thresholds(Some(dec("10")), None).is_err());
        assert!(validate_thresholds(None, Some(dec("50"))).is_err());
    }

    #[test]
    fn high_must_exceed_low() {
        assert!(validate_thresholds(Some(dec("10")), Some(dec("50"))).is_ok());
        assert!(validate_thresholds(Some(dec("50")), Some(dec("50"))).is_err());
        assert!(validate_thresholds(Some(dec("50")), Some(dec("10"))).is_err());
    }

    #[test]
    fn percent_thresholds_stay_within_bounds() {
        assert!(validate_percent_thresholds(Some(dec("20")), Some(dec("80"))).is_ok());
        assert!(validate_percent_thresholds(Some(dec("0")), Some(dec("100"))).is_ok());
        assert!(validate_percent_thresholds(Some(dec("-1")), Some(dec("80"))).is_err());
        assert!(validate_percent_thresholds(Some(dec("20")), Some(dec("101"))).is_err());
    }

    #[test]
    fn percent_thresholds_still_require_ordering() {
        assert!(validate_percent_thresholds(Some(dec("80")), Some(dec("20"))).is_err());
    }
}

mod quantities_and_weights {
    use super::*;

    #[test]
    fn quantity_bounded_by_capacity() {
        assert!(validate_quantity(0, 10).is_ok());
        assert!(validate_quantity(10, 10).is_ok());
        assert!(validate_quantity(11, 10).is_err());
        assert!(validate_quantity(-1, 10).is_err());
    }

    #[test]
    fn weight_must_not_be_negative() {
        assert!(validate_weight(Decimal::ZERO).is_ok());
        assert!(validate_weight(dec("12.5")).is_ok());
        assert!(validate_weight(dec("-0.1")).is_err());
    }

    #[test]
    fn total_units_must_be_positive() {
        assert!(validate_total_units(1).is_ok());
        assert!(validate_total_units(0).is_err());
        assert!(validate_total_units(-3).is_err());
    }
}

mod section_locations {
    use super::*;

    #[test]
    fn prefix_plus_digits_is_valid() {
        assert!(validate_location_component("F1", 'F').is_ok());
        assert!(validate_location_component("C12", 'C').is_ok());
        assert!(validate_location_component("L3", 'L').is_ok());
    }

    #[test]
    fn free_form_names_are_rejected() {
        assert!(validate_location_component("MEZZ", 'F').is_err());
        assert!(validate_location_component("1F", 'F').is_err());
        assert!(validate_location_component("Fx1", 'F').is_err());
    }

    #[test]
    fn bare_prefix_is_rejected() {
        assert!(validate_location_component("F", 'F').is_err());
        assert!(validate_location_component("", 'C').is_err());
    }

    #[test]
    fn prefix_must_match_the_component() {
        assert!(validate_location_component("C1", 'F').is_err());
        assert!(validate_location_component("f1", 'F').is_err());
    }
}

mod pagination {
    use super::*;

    #[test]
    fn zero_per_page_clamps_to_one_row() {
        let pagination = Pagination {
            page: 1,
            per_page: 0,
        };
        assert_eq!(pagination.limit(), 1);
        assert_eq!(pagination.offset(), 0);

        let meta = PaginationMeta::new(&pagination, 5);
        assert_eq!(meta.per_page as i64, pagination.limit());
        assert_eq!(meta.total_pages, 5);
    }

    #[test]
    fn offset_uses_the_clamped_page_size() {
        let pagination = Pagination {
            page: 3,
            per_page: 0,
        };
        assert_eq!(pagination.offset(), 2);
    }

    #[test]
    fn defaults_are_first_page_of_ten() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit(), 10);
        assert_eq!(pagination.offset(), 0);
    }
}
