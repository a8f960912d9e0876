//! Domain models for the Warehouse Inventory Management Platform

pub mod history;
pub mod item;
pub mod stock;
pub mod storage;
pub mod transaction;
pub mod unit;

pub use history::*;
pub use item::*;
pub use stock::*;
pub use storage::*;
pub use transaction::*;
pub use unit::*;
