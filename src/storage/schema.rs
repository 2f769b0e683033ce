//! Database schema definitions
//!
//! Table names only ever reach SQL through [`TableName`], a closed set.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storage class of a seeded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    /// Calendar date, stored as `YYYY-MM-DD` text
    Date,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text | ColumnType::Date => "TEXT",
        }
    }
}

/// A column of one of the seeded tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    /// Whether the seed file must carry this column
    pub required: bool,
    /// Whether a cell may be blank (stored as NULL)
    pub nullable: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, required: true, nullable: true }
}

const fn optional(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, required: false, nullable: true }
}

/// Read back by the listing flows, so every row must have a value.
const fn filled(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, required: true, nullable: false }
}

const PROVIDER_COLUMNS: &[ColumnDef] = &[
    col("Provider_ID", ColumnType::Integer),
    col("Name", ColumnType::Text),
    col("Type", ColumnType::Text),
    optional("Address", ColumnType::Text),
    col("City", ColumnType::Text),
    col("Contact", ColumnType::Text),
];

const RECEIVER_COLUMNS: &[ColumnDef] = &[
    col("Receiver_ID", ColumnType::Integer),
    col("Name", ColumnType::Text),
    col("Type", ColumnType::Text),
    col("City", ColumnType::Text),
    col("Contact", ColumnType::Text),
];

const FOOD_LISTING_COLUMNS: &[ColumnDef] = &[
    col("Food_ID", ColumnType::Integer),
    filled("Food_Name", ColumnType::Text),
    filled("Quantity", ColumnType::Integer),
    filled("Expiry_Date", ColumnType::Date),
    filled("Provider_ID", ColumnType::Integer),
    filled("Provider_Type", ColumnType::Text),
    filled("Location", ColumnType::Text),
    filled("Food_Type", ColumnType::Text),
    filled("Meal_Type", ColumnType::Text),
];

const CLAIM_COLUMNS: &[ColumnDef] = &[
    col("Claim_ID", ColumnType::Integer),
    col("Food_ID", ColumnType::Integer),
    col("Receiver_ID", ColumnType::Integer),
    col("Status", ColumnType::Text),
    col("Timestamp", ColumnType::Text),
];

/// The four tables of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Providers,
    Receivers,
    FoodListings,
    Claims,
}

impl TableName {
    /// Get the SQL identifier of the table
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Providers => "providers",
            TableName::Receivers => "receivers",
            TableName::FoodListings => "food_listings",
            TableName::Claims => "claims",
        }
    }

    /// Get all tables, in seeding order
    pub fn all() -> &'static [TableName] {
        &[
            TableName::Providers,
            TableName::Receivers,
            TableName::FoodListings,
            TableName::Claims,
        ]
    }

    /// Seed file read for this table
    pub fn seed_file(&self) -> &'static str {
        match self {
            TableName::Providers => "providers_data.csv",
            TableName::Receivers => "receivers_data.csv",
            TableName::FoodListings => "food_listings_data.csv",
            TableName::Claims => "claims_data.csv",
        }
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            TableName::Providers => PROVIDER_COLUMNS,
            TableName::Receivers => RECEIVER_COLUMNS,
            TableName::FoodListings => FOOD_LISTING_COLUMNS,
            TableName::Claims => CLAIM_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// `CREATE TABLE` statement. The first column is the primary key.
    pub fn create_sql(&self) -> String {
        let defs: Vec<String> = self
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == 0 {
                    let auto = if *self == TableName::FoodListings { " AUTOINCREMENT" } else { "" };
                    return format!("{} INTEGER PRIMARY KEY{}", c.name, auto);
                }
                let mut def = format!("{} {}", c.name, c.ty.sql_type());
                if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                if c.name == "Quantity" {
                    def.push_str(" CHECK (Quantity >= 1)");
                }
                def
            })
            .collect();
        format!("CREATE TABLE {} ({})", self.as_str(), defs.join(", "))
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.as_str())
    }

    /// Positional `INSERT` covering every column of the table.
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns().iter().map(|c| c.name).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.as_str(),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    pub fn select_all_sql(&self) -> String {
        format!("SELECT * FROM {}", self.as_str())
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) AS n FROM {}", self.as_str())
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "providers" | "provider" => Ok(TableName::Providers),
            "receivers" | "receiver" => Ok(TableName::Receivers),
            "food_listings" | "listings" | "food" => Ok(TableName::FoodListings),
            "claims" | "claim" => Ok(TableName::Claims),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Records which source files a store was seeded from
pub const CREATE_SEED_MANIFEST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS seed_manifest (
    table_name TEXT PRIMARY KEY,
    source_file TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    row_count INTEGER NOT NULL,
    seeded_at TEXT NOT NULL
)
"#;

/// SQL to create indexes used by the report catalog
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_providers_city ON providers(City)",
    "CREATE INDEX IF NOT EXISTS idx_receivers_city ON receivers(City)",
    "CREATE INDEX IF NOT EXISTS idx_food_listings_type ON food_listings(Food_Type)",
    "CREATE INDEX IF NOT EXISTS idx_claims_status ON claims(Status)",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_names() {
        assert_eq!("providers".parse::<TableName>().unwrap(), TableName::Providers);
        assert_eq!("Food-Listings".parse::<TableName>().unwrap(), TableName::FoodListings);
        assert_eq!(" claims ".parse::<TableName>().unwrap(), TableName::Claims);
    }

    #[test]
    fn test_rejects_unknown_table() {
        let err = "providers; DROP TABLE claims".parse::<TableName>().unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
        assert!("sqlite_master".parse::<TableName>().is_err());
    }

    #[test]
    fn test_food_listing_ddl() {
        let sql = TableName::FoodListings.create_sql();
        assert!(sql.starts_with("CREATE TABLE food_listings (Food_ID INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("Quantity INTEGER NOT NULL CHECK (Quantity >= 1)"));
        assert!(sql.contains("Expiry_Date TEXT NOT NULL"));
        assert!(sql.contains("Provider_ID INTEGER NOT NULL"));
        assert!(!TableName::Claims.create_sql().contains("NOT NULL"));
    }

    #[test]
    fn test_insert_sql_is_positional() {
        assert_eq!(
            TableName::Claims.insert_sql(),
            "INSERT INTO claims (Claim_ID, Food_ID, Receiver_ID, Status, Timestamp) VALUES (?1, ?2, ?3, ?4, ?5)"
        );
    }

    #[test]
    fn test_every_table_has_a_key_column_first() {
        for table in TableName::all() {
            let first = table.columns()[0];
            assert_eq!(first.ty, ColumnType::Integer);
            assert!(first.name.ends_with("_ID"));
        }
    }
}
