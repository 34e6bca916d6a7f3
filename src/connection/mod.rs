//! Connection subsystem
//!
//! The database driver collaborator. Queries are compiled by the connection's
//! grammar and executed through `Connection::select`; rows come back as JSON maps
//! so that hydration can go through serde.

mod errors;
mod query_log;
#[cfg(feature = "sqlite")]
mod sqlite;

use serde_json::Value;

use crate::query::{CompiledQuery, Grammar};

pub use errors::{DatabaseError, DbResult};
pub use query_log::QueryLog;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

/// One result row keyed by column name
pub type Row = serde_json::Map<String, Value>;

/// A database connection able to run compiled SELECT statements
pub trait Connection {
    /// Dialect used to compile queries for this connection
    fn grammar(&self) -> &dyn Grammar;

    /// Executes a compiled statement and returns every row
    fn select(&mut self, query: &CompiledQuery) -> DbResult<Vec<Row>>;
}
