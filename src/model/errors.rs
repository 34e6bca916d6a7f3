//! Model errors

use thiserror::Error;

use crate::connection::DatabaseError;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Model layer errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Query execution failed
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// A row could not be converted into the entity type
    #[error("Failed to hydrate row: {0}")]
    Hydration(#[from] serde_json::Error),

    /// Eager load hook failed for the named relation
    #[error("Failed to load relation '{relation}': {reason}")]
    Relation { relation: String, reason: String },
}
