//! Infrastructure layer: SQLite store, audit trail, configuration.

pub mod audit;
pub mod config;
pub mod error;
pub mod store;

pub use audit::{AuditLog, AuditVerb};
pub use config::Config;
pub use error::{InventoryError, InventoryResult};
pub use store::{CourseFilter, Inventory, SqliteInventory};
