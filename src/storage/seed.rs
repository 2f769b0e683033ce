//! Seed loader: one-time materialization of the CSV inputs into SQLite
//!
//! The presence of the database file is the only "already seeded" signal.
//! Once it exists the CSV files are never read again by `ensure_database`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};

use super::schema::{self, ColumnDef, ColumnType, TableName};
use super::value::Value;
use crate::config::{ensure_db_dir, Settings};
use crate::{Error, Result};

/// What `ensure_database` did
#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    /// The store already existed and was left untouched
    Existing,
    /// A fresh store was built from the seed files
    Seeded(Vec<SeededTable>),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SeededTable {
    pub table: TableName,
    pub rows: usize,
}

/// One parsed seed file, ready to be written
#[derive(Debug)]
struct SeedTable {
    table: TableName,
    source: PathBuf,
    hash: String,
    rows: Vec<Vec<Value>>,
}

/// Seed the store if it does not exist yet.
pub fn ensure_database(settings: &Settings) -> Result<SeedOutcome> {
    if settings.database.exists() {
        tracing::debug!("Store {} already present, skipping seed", settings.database.display());
        return Ok(SeedOutcome::Existing);
    }
    seed(settings).map(SeedOutcome::Seeded)
}

/// Throw away the current store and seed a new one from the CSV files.
pub fn reseed(settings: &Settings) -> Result<Vec<SeededTable>> {
    if settings.database.exists() {
        tracing::info!("Removing {} for reseed", settings.database.display());
        std::fs::remove_file(&settings.database)?;
    }
    seed(settings)
}

fn seed(settings: &Settings) -> Result<Vec<SeededTable>> {
    // Parse everything before creating the file so bad input leaves no store behind.
    let tables = TableName::all()
        .iter()
        .map(|table| read_seed_file(*table, &settings.data_dir.join(table.seed_file())))
        .collect::<Result<Vec<_>>>()?;

    ensure_db_dir(&settings.database)?;
    match write_store(&settings.database, &tables) {
        Ok(summary) => Ok(summary),
        Err(e) => {
            tracing::error!("Seeding {} failed: {}", settings.database.display(), e);
            if settings.database.exists() {
                if let Err(rm) = std::fs::remove_file(&settings.database) {
                    tracing::warn!("Could not remove partial store {}: {}", settings.database.display(), rm);
                }
            }
            Err(e)
        }
    }
}

fn read_seed_file(table: TableName, path: &Path) -> Result<SeedTable> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::Seed(format!("cannot read {} for table {}: {}", path.display(), table, e))
    })?;
    let hash = blake3::hash(&bytes).to_hex().to_string();

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes.as_slice());
    let headers = reader.headers()?.clone();
    let positions = map_headers(table, &headers, path)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let row = table
            .columns()
            .iter()
            .zip(&positions)
            .map(|(column, pos)| {
                let raw = pos.and_then(|p| record.get(p)).unwrap_or("");
                coerce_cell(raw, column).map_err(|msg| {
                    // +2: header line plus 1-based numbering
                    Error::Seed(format!("{}:{} column {}: {}", path.display(), line + 2, column.name, msg))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), "Parsed {}", path.display());
    Ok(SeedTable {
        table,
        source: path.to_path_buf(),
        hash,
        rows,
    })
}

/// Position of each expected column in the file header. Names must match
/// exactly; order is free.
fn map_headers(table: TableName, headers: &csv::StringRecord, path: &Path) -> Result<Vec<Option<usize>>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        if table.column(name).is_none() {
            return Err(Error::Seed(format!(
                "{}: unexpected column '{}' for table {}",
                path.display(),
                name,
                table
            )));
        }
        if index.insert(name, i).is_some() {
            return Err(Error::Seed(format!("{}: duplicate column '{}'", path.display(), name)));
        }
    }

    table
        .columns()
        .iter()
        .map(|column| match index.get(column.name) {
            Some(i) => Ok(Some(*i)),
            None if !column.required => Ok(None),
            None => Err(Error::Seed(format!(
                "{}: missing column '{}' for table {}",
                path.display(),
                column.name,
                table
            ))),
        })
        .collect()
}

fn coerce_cell(raw: &str, column: &ColumnDef) -> std::result::Result<Value, String> {
    if raw.is_empty() {
        return if column.nullable {
            Ok(Value::Null)
        } else {
            Err("value is required".to_string())
        };
    }
    match column.ty {
        ColumnType::Text => Ok(Value::Text(raw.to_string())),
        ColumnType::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("'{}' is not an integer", raw)),
        ColumnType::Date => parse_date(raw)
            .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
            .map_err(|e| e.to_string()),
    }
}

/// Accepts ISO `YYYY-MM-DD` and US `M/D/YYYY` dates.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

fn write_store(path: &Path, tables: &[SeedTable]) -> Result<Vec<SeededTable>> {
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(schema::CREATE_SEED_MANIFEST_TABLE)?;

    let seeded_at = chrono::Utc::now().to_rfc3339();
    let mut summary = Vec::with_capacity(tables.len());

    for seed in tables {
        tx.execute(&seed.table.drop_sql(), [])?;
        tx.execute(&seed.table.create_sql(), [])?;
        {
            let mut stmt = tx.prepare(&seed.table.insert_sql())?;
            for row in &seed.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO seed_manifest (table_name, source_file, content_hash, row_count, seeded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                seed.table.as_str(),
                seed.source.display().to_string(),
                seed.hash,
                seed.rows.len() as i64,
                seeded_at,
            ],
        )?;

        tracing::info!("Seeded {} rows into {}", seed.rows.len(), seed.table);
        summary.push(SeededTable {
            table: seed.table,
            rows: seed.rows.len(),
        });
    }

    for stmt in schema::CREATE_INDEXES {
        tx.execute(stmt, [])?;
    }
    tx.commit()?;
    Ok(summary)
}

/// Freshness of one seed file relative to the store
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    Unchanged,
    Changed,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SourceStatus {
    pub table: TableName,
    pub source_file: String,
    pub rows: i64,
    pub seeded_at: String,
    pub state: SourceState,
}

/// Compare the seed files on disk with the hashes recorded at seed time.
/// Nothing is re-ingested; callers decide whether to `reseed`.
pub fn check_staleness(settings: &Settings) -> Result<Vec<SourceStatus>> {
    let conn = Connection::open_with_flags(&settings.database, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(
        "SELECT table_name, source_file, content_hash, row_count, seeded_at FROM seed_manifest ORDER BY rowid",
    )?;
    let recorded = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    recorded
        .into_iter()
        .map(|(table_name, source_file, hash, rows, seeded_at)| {
            let table: TableName = table_name.parse()?;
            let state = match std::fs::read(settings.data_dir.join(table.seed_file())) {
                Ok(bytes) if blake3::hash(&bytes).to_hex().as_str() == hash => SourceState::Unchanged,
                Ok(_) => SourceState::Changed,
                Err(_) => SourceState::Missing,
            };
            if state != SourceState::Unchanged {
                tracing::warn!("Seed file for {} is {:?} since {}", table, state, seeded_at);
            }
            Ok(SourceStatus {
                table,
                source_file,
                rows,
                seeded_at,
                state,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const PROVIDERS: &str = "\
Provider_ID,Name,Type,Address,City,Contact
1,Green Bistro,Restaurant,12 Main St,Austin,555-0100
2,Fresh Mart,Grocery Store,9 Elm Rd,Boston,555-0101
3,Corner Bakery,Restaurant,4 Oak Ave,Austin,555-0102
";

    pub const RECEIVERS: &str = "\
Receiver_ID,Name,Type,City,Contact
1,Hope Shelter,Shelter,Austin,555-0200
2,Food For All,NGO,Chicago,555-0201
";

    pub const FOOD_LISTINGS: &str = "\
Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
1,Bread,20,3/17/2025,3,Restaurant,Austin,Vegetarian,Breakfast
2,Chicken,5,2025-03-20,1,Restaurant,Austin,Non-Vegetarian,Dinner
3,Salad,8,2025-03-18,2,Grocery Store,Boston,Vegan,Lunch
4,Pasta,12,2025-03-19,1,Restaurant,Austin,Vegetarian,Dinner
";

    pub const CLAIMS: &str = "\
Claim_ID,Food_ID,Receiver_ID,Status,Timestamp
1,1,1,Completed,2025-03-05 05:26:00
2,2,2,Pending,2025-03-06 10:00:00
3,3,1,Completed,2025-03-07 12:30:00
";

    /// Writes the four fixture files and returns settings pointing at them.
    pub fn fixture_settings(dir: &Path) -> Settings {
        write_fixture(dir, TableName::Providers, PROVIDERS);
        write_fixture(dir, TableName::Receivers, RECEIVERS);
        write_fixture(dir, TableName::FoodListings, FOOD_LISTINGS);
        write_fixture(dir, TableName::Claims, CLAIMS);
        Settings::new(dir.join("store").join("food_waste.db"), dir)
    }

    pub fn write_fixture(dir: &Path, table: TableName, contents: &str) {
        std::fs::write(dir.join(table.seed_file()), contents).unwrap();
    }

    #[test]
    fn test_seed_creates_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());

        let outcome = ensure_database(&settings).unwrap();
        let SeedOutcome::Seeded(summary) = outcome else {
            panic!("expected a fresh seed");
        };
        let counts: Vec<_> = summary.iter().map(|s| (s.table, s.rows)).collect();
        assert_eq!(
            counts,
            vec![
                (TableName::Providers, 3),
                (TableName::Receivers, 2),
                (TableName::FoodListings, 4),
                (TableName::Claims, 3),
            ]
        );
        assert!(settings.database.exists());
    }

    #[test]
    fn test_existing_store_is_not_reseeded() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        ensure_database(&settings).unwrap();

        // Source edits after the first run are ignored.
        write_fixture(dir.path(), TableName::Receivers, "Receiver_ID,Name,Type,City,Contact\n");
        assert_eq!(ensure_database(&settings).unwrap(), SeedOutcome::Existing);

        let gw = crate::Gateway::new(&settings.database);
        let frame = gw.query("SELECT COUNT(*) AS n FROM receivers", &[]).unwrap();
        assert_eq!(frame.get(0, "n"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_dates_normalized_to_iso() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        ensure_database(&settings).unwrap();

        let gw = crate::Gateway::new(&settings.database);
        let frame = gw
            .query("SELECT Expiry_Date FROM food_listings WHERE Food_ID = ?1", &crate::values![1i64])
            .unwrap();
        assert_eq!(frame.get(0, "Expiry_Date"), Some(&Value::from("2025-03-17")));
    }

    #[test]
    fn test_header_order_is_free_and_address_optional() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        write_fixture(
            dir.path(),
            TableName::Providers,
            "City,Contact,Provider_ID,Type,Name\nDenver,555-0300,7,Caterer,Big Pot\n",
        );
        ensure_database(&settings).unwrap();

        let gw = crate::Gateway::new(&settings.database);
        let frame = gw.query("SELECT * FROM providers", &[]).unwrap();
        assert_eq!(frame.get(0, "Name"), Some(&Value::from("Big Pot")));
        assert_eq!(frame.get(0, "Provider_ID"), Some(&Value::Integer(7)));
        assert!(frame.get(0, "Address").unwrap().is_null());
    }

    #[test]
    fn test_missing_file_is_fatal_and_leaves_no_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        std::fs::remove_file(dir.path().join(TableName::Claims.seed_file())).unwrap();

        let err = ensure_database(&settings).unwrap_err();
        assert!(matches!(err, Error::Seed(_)));
        assert!(!settings.database.exists());
    }

    #[test]
    fn test_unknown_or_missing_columns_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        write_fixture(dir.path(), TableName::Claims, "Claim_ID,Food_ID,Receiver_ID,Status\n1,1,1,Pending\n");
        assert!(matches!(ensure_database(&settings), Err(Error::Seed(_))));

        write_fixture(
            dir.path(),
            TableName::Claims,
            "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp,Extra\n1,1,1,Pending,now,x\n",
        );
        assert!(matches!(ensure_database(&settings), Err(Error::Seed(_))));
        assert!(!settings.database.exists());
    }

    #[test]
    fn test_malformed_cell_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        write_fixture(
            dir.path(),
            TableName::FoodListings,
            "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type\n\
             1,Bread,lots,2025-03-17,3,Restaurant,Austin,Vegetarian,Breakfast\n",
        );
        let err = ensure_database(&settings).unwrap_err();
        assert!(err.to_string().contains("Quantity"));
    }

    #[test]
    fn test_blank_listing_cells_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        write_fixture(
            dir.path(),
            TableName::FoodListings,
            "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type\n\
             2,Soup,4,2025-03-18,,Restaurant,Austin,Vegan,Lunch\n",
        );
        let err = ensure_database(&settings).unwrap_err();
        assert!(matches!(err, Error::Seed(_)));
        assert!(err.to_string().contains("Provider_ID"));
        assert!(!settings.database.exists());
    }

    #[test]
    fn test_blank_cells_elsewhere_are_null() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        write_fixture(
            dir.path(),
            TableName::Receivers,
            "Receiver_ID,Name,Type,City,Contact\n1,Hope Shelter,Shelter,Austin,\n",
        );
        ensure_database(&settings).unwrap();

        let gw = crate::Gateway::new(&settings.database);
        let frame = gw.query("SELECT Contact FROM receivers", &[]).unwrap();
        assert!(frame.get(0, "Contact").unwrap().is_null());
    }

    #[test]
    fn test_write_failure_removes_partial_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        // Duplicate primary key is only caught by SQLite, after the file exists.
        write_fixture(
            dir.path(),
            TableName::Receivers,
            "Receiver_ID,Name,Type,City,Contact\n1,A,NGO,X,1\n1,B,NGO,Y,2\n",
        );
        // The SQLite error is what surfaces, not the cleanup.
        assert!(matches!(ensure_database(&settings), Err(Error::Storage(_))));
        assert!(!settings.database.exists());
    }

    #[test]
    fn test_staleness_and_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let settings = fixture_settings(dir.path());
        ensure_database(&settings).unwrap();

        let status = check_staleness(&settings).unwrap();
        assert_eq!(status.len(), 4);
        assert!(status.iter().all(|s| s.state == SourceState::Unchanged));

        write_fixture(dir.path(), TableName::Receivers, "Receiver_ID,Name,Type,City,Contact\n");
        std::fs::remove_file(dir.path().join(TableName::Claims.seed_file())).unwrap();
        let status = check_staleness(&settings).unwrap();
        let state_of = |t: TableName| status.iter().find(|s| s.table == t).unwrap().state.clone();
        assert_eq!(state_of(TableName::Receivers), SourceState::Changed);
        assert_eq!(state_of(TableName::Claims), SourceState::Missing);
        assert_eq!(state_of(TableName::Providers), SourceState::Unchanged);

        write_fixture(dir.path(), TableName::Claims, CLAIMS);
        let summary = reseed(&settings).unwrap();
        let receivers = summary.iter().find(|s| s.table == TableName::Receivers).unwrap();
        assert_eq!(receivers.rows, 0);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-01-01").unwrap(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(parse_date("3/7/2025").unwrap(), NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        assert!(matches!(parse_date("tomorrow"), Err(Error::InvalidDate(_))));
    }
}
