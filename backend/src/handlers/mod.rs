//! HTTP handlers for the Warehouse Inventory Management Platform

pub mod containers;
pub mod dashboard;
pub mod health;
pub mod items;
pub mod large_items;
pub mod partitions;
pub mod rfid_tags;
pub mod storage_sections;
pub mod transactions;
pub mod vision;

pub use containers::*;
pub use dashboard::*;
pub use health::*;
pub use items::*;
pub use large_items::*;
pub use partitions::*;
pub use rfid_tags::*;
pub use storage_sections::*;
pub use transactions::*;
pub use vision::*;
