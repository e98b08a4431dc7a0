pub mod app_config;
pub mod database;
pub mod memory;
pub mod pg;

pub use database::DbClient;
pub use memory::MemoryInventoryStore;
pub use pg::PgInventoryStore;
