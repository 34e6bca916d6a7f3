//! Database errors
//!
//! Never recovered by the pagination layer; they reach the caller unchanged.

use thiserror::Error;

/// Result type for database operations
pub type DbResult<T> = Result<T, DatabaseError>;

/// Database driver errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Error reported by SQLite
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Aggregate query returned no usable `aggregate` column
    #[error("Aggregate query returned no count")]
    MissingAggregate,

    /// Binding value the driver cannot represent
    #[error("Unsupported binding value: {0}")]
    UnsupportedBinding(String),

    /// Any other driver failure
    #[error("Query failed: {0}")]
    Query(String),
}
