//! DuckDB connection wrapper for the local collection store.
//!
//! Opens (or creates) the database file, applies the schema on open and
//! converts result rows into `serde_json` values so they can be deserialized
//! straight into the crate's models.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use duckdb::types::{Value, ValueRef};
use duckdb::Connection as DuckDbConnection;
use serde::de::DeserializeOwned;

use crate::config;
use crate::error::Result;

/// Wraps a DuckDB connection holding the `user_cards`, `decks` and
/// `deck_cards` tables.
pub struct Connection {
    conn: DuckDbConnection,
    path: Option<PathBuf>,
}

impl Connection {
    /// Open the database at `path`, creating parent directories and tables
    /// as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = DuckDbConnection::open(path)?;
        let this = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        this.init_schema()?;
        tracing::debug!(path = %path.display(), "opened collection database");
        Ok(this)
    }

    /// Open a throwaway in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let this = Self { conn, path: None };
        this.init_schema()?;
        Ok(this)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(&config::schema_sql())?;
        Ok(())
    }

    /// Database file, or `None` for in-memory connections.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind(params).as_slice())?;

        // Column metadata is only available once the statement has run.
        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[Value]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind(params).as_slice())?;
        match rows.next()? {
            Some(row) => Ok(Some(convert_value_ref(row.get_ref(0)?))),
            None => Ok(None),
        }
    }

    /// Run a statement that returns no rows. Returns the affected row count.
    pub fn execute_update(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        Ok(stmt.execute(bind(params).as_slice())?)
    }

    /// Run `f` inside a transaction, rolling back if it returns an error.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

fn bind(params: &[Value]) -> Vec<&dyn duckdb::ToSql> {
    params.iter().map(|p| p as &dyn duckdb::ToSql).collect()
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value as Json;

    match val {
        ValueRef::Null => Json::Null,
        ValueRef::Boolean(b) => Json::Bool(b),
        ValueRef::TinyInt(n) => Json::Number(n.into()),
        ValueRef::SmallInt(n) => Json::Number(n.into()),
        ValueRef::Int(n) => Json::Number(n.into()),
        ValueRef::BigInt(n) => Json::Number(n.into()),
        ValueRef::UTinyInt(n) => Json::Number(n.into()),
        ValueRef::USmallInt(n) => Json::Number(n.into()),
        ValueRef::UInt(n) => Json::Number(n.into()),
        ValueRef::UBigInt(n) => Json::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Json::Number(i.into()),
            Err(_) => Json::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        ValueRef::Text(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        // Timestamps are stored as VARCHAR; anything else has no column here.
        _ => Json::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_applied_in_memory() {
        let conn = Connection::open_in_memory().unwrap();
        for table in [config::CARDS_TABLE, config::DECKS_TABLE, config::DECK_CARDS_TABLE] {
            let count = conn
                .execute_scalar(&format!("SELECT COUNT(*) FROM {}", table), &[])
                .unwrap();
            assert_eq!(count, Some(serde_json::json!(0)));
        }
        assert!(conn.path().is_none());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        let result: Result<()> = conn.transaction(|c| {
            c.execute_update(
                "INSERT INTO decks (id, user_id, name) VALUES (?, ?, ?)",
                &["d1".to_string().into(), "u1".to_string().into(), "Blue".to_string().into()],
            )?;
            Err(crate::error::CollectionError::InvalidArgument("abort".into()))
        });
        assert!(result.is_err());
        let count = conn.execute_scalar("SELECT COUNT(*) FROM decks", &[]).unwrap();
        assert_eq!(count, Some(serde_json::json!(0)));
    }

    #[test]
    fn execute_maps_columns_by_name() {
        let conn = Connection::open_in_memory().unwrap();
        let rows = conn
            .execute("SELECT 1 AS one, 'x' AS letter, NULL AS nothing", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["one"], serde_json::json!(1));
        assert_eq!(rows[0]["letter"], serde_json::json!("x"));
        assert_eq!(rows[0]["nothing"], serde_json::Value::Null);
    }
}
