//! Tests for storage section ids and capacity math

use proptest::prelude::*;
use shared::{
    available_units, can_reserve, generate_section_id, lock_order, release_clamped,
    utilization_rate, SectionColor,
};

mod section_ids {
    use super::*;

    #[test]
    fn id_is_location_plus_color_initial() {
        assert_eq!(
            generate_section_id("F1", "C2", "L3", SectionColor::Red),
            "F1-C2-L3-R"
        );
        assert_eq!(
            generate_section_id("F2", "C10", "L1", SectionColor::Yellow),
            "F2-C10-L1-Y"
        );
    }

    #[test]
    fn each_color_maps_to_a_distinct_initial() {
        let initials: Vec<String> = [
            SectionColor::Red,
            SectionColor::Blue,
            SectionColor::Green,
            SectionColor::Yellow,
        ]
        .iter()
        .map(|c| generate_section_id("F1", "C1", "L1", *c))
        .collect();
        assert_eq!(initials, ["F1-C1-L1-R", "F1-C1-L1-B", "F1-C1-L1-G", "F1-C1-L1-Y"]);
    }

    #[test]
    fn color_sort_order_is_red_green_blue_yellow() {
        assert!(SectionColor::Red.sort_index() < SectionColor::Green.sort_index());
        assert!(SectionColor::Green.sort_index() < SectionColor::Blue.sort_index());
        assert!(SectionColor::Blue.sort_index() < SectionColor::Yellow.sort_index());
    }
}

mod capacity_math {
    use super::*;

    #[test]
    fn reservation_within_capacity_is_allowed() {
        assert!(can_reserve(3, 10, 7));
        assert!(!can_reserve(3, 10, 8));
    }

    #[test]
    fn full_section_rejects_any_reservation() {
        assert!(!can_reserve(10, 10, 1));
        assert!(can_reserve(10, 10, 0));
    }

    #[test]
    fn release_clamps_at_zero() {
        assert_eq!(release_clamped(3, 5), 0);
        assert_eq!(release_clamped(5, 3), 2);
        assert_eq!(release_clamped(0, 1), 0);
    }

    #[test]
    fn available_units_never_negative() {
        assert_eq!(available_units(12, 10), 0);
        assert_eq!(available_units(4, 10), 6);
    }

    #[test]
    fn utilization_is_bounded() {
        assert_eq!(utilization_rate(5, 10), 0.5);
        assert_eq!(utilization_rate(15, 10), 1.0);
        assert_eq!(utilization_rate(3, 0), 0.0);
    }

    #[test]
    fn lock_order_is_symmetric() {
        assert_eq!(lock_order("F1-C1-L1-R", "F2-C1-L1-R"), ("F1-C1-L1-R", "F2-C1-L1-R"));
        assert_eq!(lock_order("F2-C1-L1-R", "F1-C1-L1-R"), ("F1-C1-L1-R", "F2-C1-L1-R"));
        assert_eq!(lock_order("A", "A"), ("A", "A"));
    }
}

proptest! {
    /// Reserving then releasing the same amount restores the used count
    #[test]
    fn prop_reserve_release_round_trip(used in 0i32..100, total in 1i32..200, units in 0i32..50) {
        prop_assume!(used <= total);
        if can_reserve(used, total, units) {
            let after_reserve = used + units;
            prop_assert!(after_reserve <= total);
            prop_assert_eq!(release_clamped(after_reserve, units), used);
        }
    }

    /// Used units never go negative regardless of release size
    #[test]
    fn prop_release_never_negative(used in 0i32..100, units in 0i32..200) {
        prop_assert!(release_clamped(used, units) >= 0);
    }
}
