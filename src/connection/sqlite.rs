//! SQLite connection
//!
//! Result cells are mapped to JSON values:
//! - INTEGER -> number
//! - REAL -> number (non-finite -> null)
//! - TEXT -> string
//! - BLOB -> base64 string
//! - NULL -> null

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Number, Value};

use crate::query::{CompiledQuery, Grammar, SqliteGrammar};

use super::errors::DbResult;
use super::{Connection, Row};

/// Connection backed by an embedded SQLite database
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    grammar: SqliteGrammar,
}

impl SqliteConnection {
    /// Opens a private in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(rusqlite::Connection::open_in_memory()?))
    }

    /// Opens (or creates) a database file
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(rusqlite::Connection::open(path)?))
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            grammar: SqliteGrammar,
        }
    }

    /// Runs one or more statements without bindings (schema setup, fixtures)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Runs a single statement with bindings, returning the affected row count
    pub fn execute(&self, sql: &str, bindings: &[Value]) -> DbResult<usize> {
        let params = bindings.iter().map(to_sql_value);
        Ok(self.conn.execute(sql, rusqlite::params_from_iter(params))?)
    }

    /// Underlying rusqlite handle
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl Connection for SqliteConnection {
    fn grammar(&self) -> &dyn Grammar {
        &self.grammar
    }

    fn select(&mut self, query: &CompiledQuery) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let params = query.bindings.iter().map(to_sql_value);
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                record.insert(name.clone(), from_sql_value(row.get_ref(idx)?));
            }
            out.push(record);
        }
        Ok(out)
    }
}

/// JSON binding -> SQLite value
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// SQLite cell -> JSON value
fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(STANDARD.encode(bytes)),
    }
}
