//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - providers(Provider_ID, Name, Type, Address, City, Contact)
//! - receivers(Receiver_ID, Name, Type, City, Contact)
//! - food_listings(Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type)
//! - claims(Claim_ID, Food_ID, Receiver_ID, Status, Timestamp)
//! - seed_manifest(table_name, source_file, content_hash, row_count, seeded_at)

pub mod gateway;
pub mod schema;
pub mod seed;
pub mod value;

pub use gateway::Gateway;
pub use schema::{ColumnDef, ColumnType, TableName};
pub use seed::{SeedOutcome, SeededTable, SourceState, SourceStatus, check_staleness, ensure_database, reseed};
pub use value::{Frame, Value};

use crate::Result;

/// Full contents of one of the four tables. The table name comes from the
/// closed [`TableName`] set, never from caller text.
pub fn view_table(gateway: &Gateway, table: TableName) -> Result<Frame> {
    gateway.query(&table.select_all_sql(), &[])
}
