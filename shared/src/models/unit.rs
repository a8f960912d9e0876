//! Physical unit status shared by partitions, large items and containers

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a unit is in its storage section or checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Withdrawn,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for UnitStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(UnitStatus::Available),
            "withdrawn" => Ok(UnitStatus::Withdrawn),
            _ => Err("unknown unit status"),
        }
    }
}
