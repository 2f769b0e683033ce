//! # Foodshare - Food donation matching dashboard
//!
//! Connects food providers with receivers to cut food waste.
//!
//! Foodshare provides:
//! - One-time seeding of providers, receivers, listings and claims from CSV
//! - A narrow parameterized gateway over the SQLite store
//! - A fixed catalog of aggregate reports
//! - Create, update and delete flows for food listings

pub mod config;
pub mod listing;
pub mod report;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use listing::{FoodListing, ListingChoice, ListingDetails};
pub use report::Report;
pub use storage::{Frame, Gateway, TableName, Value};

/// Result type alias for Foodshare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Foodshare operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Unknown report: {0}")]
    UnknownReport(String),
}
