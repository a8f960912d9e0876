//! Item catalog types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three kinds of physical units an item can be stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Partition,
    LargeItem,
    Container,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Partition => "partition",
            ItemType::LargeItem => "large_item",
            ItemType::Container => "container",
        }
    }

    /// Measure method is fully determined by the item type
    pub fn measure_method(&self) -> Option<MeasureMethod> {
        match self {
            ItemType::Partition => Some(MeasureMethod::Vision),
            ItemType::LargeItem => None,
            ItemType::Container => Some(MeasureMethod::Weight),
        }
    }

    /// Prefix used for stat history snapshot ids (ISH-P1, ISH-L1, ISH-C1, ...)
    pub fn history_prefix(&self) -> &'static str {
        match self {
            ItemType::Partition => "ISH-P",
            ItemType::LargeItem => "ISH-L",
            ItemType::Container => "ISH-C",
        }
    }
}

impl FromStr for ItemType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partition" => Ok(ItemType::Partition),
            "large_item" => Ok(ItemType::LargeItem),
            "container" => Ok(ItemType::Container),
            _ => Err("unknown item type"),
        }
    }
}

/// How stock of an item is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMethod {
    Vision,
    Weight,
}

impl MeasureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureMethod::Vision => "vision",
            MeasureMethod::Weight => "weight",
        }
    }
}

impl FromStr for MeasureMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vision" => Ok(MeasureMethod::Vision),
            "weight" => Ok(MeasureMethod::Weight),
            _ => Err("unknown measure method"),
        }
    }
}
