//! Shared types and domain logic for the Warehouse Inventory Management Platform
//!
//! This crate contains the pure parts of the system: enums, stock-status math,
//! history aggregation, and validation helpers. It has no database dependency,
//! so everything in here is directly unit-testable.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
