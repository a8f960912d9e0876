//! Validation utilities for the Warehouse Inventory Management Platform

use rust_decimal::Decimal;

/// Validate a threshold pair: both must be set together, high strictly above low
pub fn validate_thresholds(
    low: Option<Decimal>,
    high: Option<Decimal>,
) -> Result<(), &'static str> {
    match (low, high) {
        (None, None) => Ok(()),
        (Some(_), None) | (None, Some(_)) => {
            Err("low and high thresholds must be set together")
        }
        (Some(low), Some(high)) => {
            if high <= low {
                Err("high threshold must be greater than low threshold")
            } else {
                Ok(())
            }
        }
    }
}

/// Partition thresholds are fill percentages and must stay within [0, 100]
pub fn validate_percent_thresholds(
    low: Option<Decimal>,
    high: Option<Decimal>,
) -> Result<(), &'static str> {
    validate_thresholds(low, high)?;
    for value in [low, high].into_iter().flatten() {
        if value < Decimal::ZERO || value > Decimal::from(100) {
            return Err("percentage thresholds must be between 0 and 100");
        }
    }
    Ok(())
}

/// Partition quantity must stay within [0, capacity]
pub fn validate_quantity(quantity: i32, capacity: i32) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("quantity cannot be negative");
    }
    if quantity > capacity {
        return Err("quantity cannot exceed capacity");
    }
    Ok(())
}

/// Weights must not be negative
pub fn validate_weight(weight: Decimal) -> Result<(), &'static str> {
    if weight < Decimal::ZERO {
        return Err("weight cannot be negative");
    }
    Ok(())
}

/// Section unit counts must be positive
pub fn validate_total_units(total_units: i32) -> Result<(), &'static str> {
    if total_units <= 0 {
        return Err("total units must be positive");
    }
    Ok(())
}

/// Section location components are a fixed prefix letter followed by digits,
/// e.g. "F1", "C12", "L3"
pub fn validate_location_component(value: &str, prefix: char) -> Result<(), &'static str> {
    let mut chars = value.chars();
    if chars.next() != Some(prefix) {
        return Err("must start with its location prefix letter");
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("prefix must be followed by digits");
    }
    Ok(())
}
