//! Pagination errors
//!
//! Rewrite incompatibilities are not errors; they never reach this type.

use thiserror::Error;

use crate::connection::DatabaseError;
use crate::model::ModelError;

/// Result type for pagination operations
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Pagination errors
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Hydration or eager loading failed
    #[error("{0}")]
    Model(#[from] ModelError),

    /// Query execution failed
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// Key query row did not contain the primary key column
    #[error("Key column '{0}' missing from key query row")]
    MissingKey(String),

    /// Key value cannot be used in an integer membership filter
    #[error("Key value {0} is not an integer")]
    InvalidKey(String),

    /// No paginator is registered under this name
    #[error("Unknown pagination capability: {0}")]
    UnknownCapability(String),
}
