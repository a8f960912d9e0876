//! Storage section types and capacity math

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color code of a storage section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl SectionColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionColor::Red => "red",
            SectionColor::Blue => "blue",
            SectionColor::Green => "green",
            SectionColor::Yellow => "yellow",
        }
    }

    /// Display ordering used by section listings
    pub fn sort_index(&self) -> u8 {
        match self {
            SectionColor::Red => 1,
            SectionColor::Green => 2,
            SectionColor::Blue => 3,
            SectionColor::Yellow => 4,
        }
    }
}

impl FromStr for SectionColor {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(SectionColor::Red),
            "blue" => Ok(SectionColor::Blue),
            "green" => Ok(SectionColor::Green),
            "yellow" => Ok(SectionColor::Yellow),
            _ => Err("unknown section color"),
        }
    }
}

/// Deterministic section id from its physical location components,
/// e.g. ("F1", "C2", "L3", Red) -> "F1-C2-L3-R"
pub fn generate_section_id(
    floor: &str,
    cabinet: &str,
    layer: &str,
    color: SectionColor,
) -> String {
    let color_code = color
        .as_str()
        .chars()
        .next()
        .unwrap_or('x')
        .to_ascii_uppercase();
    format!("{}-{}-{}-{}", floor, cabinet, layer, color_code)
}

/// Deterministic ordering for acquiring two section row locks. Both call
/// orders yield the same pair, so concurrent opposite-direction moves take
/// the locks in the same sequence.
pub fn lock_order<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Units still free in a section, never negative
pub fn available_units(used_units: i32, total_units: i32) -> i32 {
    (total_units - used_units).max(0)
}

/// Utilization in [0.0, 1.0]; 0 when the section has no capacity
pub fn utilization_rate(used_units: i32, total_units: i32) -> f64 {
    if total_units <= 0 {
        return 0.0;
    }
    (used_units as f64 / total_units as f64).min(1.0)
}

/// Whether a reservation of `units` fits within the section's capacity
pub fn can_reserve(used_units: i32, total_units: i32, units: i32) -> bool {
    used_units + units <= total_units
}

/// Used-unit count after releasing `units`, clamped at zero
pub fn release_clamped(used_units: i32, units: i32) -> i32 {
    (used_units - units).max(0)
}
