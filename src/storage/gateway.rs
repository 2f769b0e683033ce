//! Parameterized read/write gateway over the SQLite store
//!
//! Every call opens its own connection and drops it before returning, on
//! success and error alike. Nothing is pooled or shared between calls.

use std::path::PathBuf;

use rusqlite::{params_from_iter, Connection, OpenFlags};

use super::value::{Frame, Value};
use crate::Result;

/// Narrow read/write interface to the store at a fixed path.
#[derive(Debug, Clone)]
pub struct Gateway {
    path: PathBuf,
}

impl Gateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection> {
        // Never create a store here; only the seed loader does that.
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }

    /// Run a read and materialize every row. Zero rows yields an empty frame.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Frame> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(rows = rows.len(), "query: {}", compact(sql));
        Ok(Frame::new(columns, rows))
    }

    /// Run one mutating statement. It commits when the call returns.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute(sql, params_from_iter(params.iter()))?;
        tracing::debug!(changed, "execute: {}", compact(sql));
        Ok(())
    }

    /// Run one `INSERT` and return the rowid the store assigned.
    pub fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(sql, params_from_iter(params.iter()))?;
        let rowid = conn.last_insert_rowid();
        tracing::debug!(rowid, "insert: {}", compact(sql));
        Ok(rowid)
    }
}

fn compact(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{values, Error};

    fn gateway_with_table() -> (tempfile::TempDir, Gateway) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, qty INTEGER, price REAL)",
        )
        .unwrap();
        (dir, Gateway::new(path))
    }

    #[test]
    fn test_query_empty_table_keeps_columns() {
        let (_dir, gw) = gateway_with_table();
        let frame = gw.query("SELECT id, name FROM items", &[]).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.columns(), ["id", "name"]);
    }

    #[test]
    fn test_execute_then_query_with_params() {
        let (_dir, gw) = gateway_with_table();
        gw.execute(
            "INSERT INTO items (name, qty, price) VALUES (?1, ?2, ?3)",
            &values!["bread", 4i64, 2.5],
        )
        .unwrap();
        gw.execute("INSERT INTO items (name, qty) VALUES (?, ?)", &values!["milk", None::<i64>])
            .unwrap();

        let frame = gw.query("SELECT name, qty, price FROM items WHERE name = ?1", &values!["bread"]).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(0, "qty"), Some(&Value::Integer(4)));
        assert_eq!(frame.get(0, "price"), Some(&Value::Real(2.5)));

        let frame = gw.query("SELECT qty FROM items WHERE name = 'milk'", &[]).unwrap();
        assert!(frame.get(0, "qty").unwrap().is_null());
    }

    #[test]
    fn test_bound_text_is_not_interpreted_as_sql() {
        let (_dir, gw) = gateway_with_table();
        let hostile = "x'); DROP TABLE items; --";
        gw.execute("INSERT INTO items (name) VALUES (?1)", &values![hostile]).unwrap();

        let frame = gw.query("SELECT name FROM items", &[]).unwrap();
        assert_eq!(frame.get(0, "name"), Some(&Value::from(hostile)));
    }

    #[test]
    fn test_insert_returns_rowid() {
        let (_dir, gw) = gateway_with_table();
        let first = gw.insert("INSERT INTO items (name) VALUES (?1)", &values!["a"]).unwrap();
        let second = gw.insert("INSERT INTO items (name) VALUES (?1)", &values!["b"]).unwrap();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_errors_propagate() {
        let (_dir, gw) = gateway_with_table();
        let err = gw.query("SELEC nonsense", &[]).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        let err = gw.execute("INSERT INTO items (name) VALUES (NULL)", &[]).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let gw = Gateway::new(&path);
        assert!(gw.query("SELECT 1", &[]).is_err());
        assert!(!path.exists());
    }
}
