pub mod availability;
pub mod legs;
pub mod models;
pub mod pnr;
pub mod repository;
pub mod schedule;
pub mod service;

pub use repository::InventoryStore;
pub use service::InventoryService;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Reservation failed: {0}")]
    Reservation(String),
    #[error("Booking failed: {0}")]
    Booking(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
