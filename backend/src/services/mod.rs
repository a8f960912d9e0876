//! Business logic services for the Warehouse Inventory Management Platform

pub mod container;
pub mod history;
pub mod item;
pub mod large_item;
pub mod partition;
pub mod rfid;
pub mod stats;
pub mod storage_section;
pub mod transaction;

pub use container::ContainerService;
pub use history::HistoryService;
pub use item::ItemService;
pub use large_item::LargeItemService;
pub use partition::PartitionService;
pub use rfid::RfidService;
pub use storage_section::SectionService;
pub use transaction::TransactionService;
