//! Error types for the records crate.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Update or delete targeted a row that does not exist for this owner
    #[error("No {collection} row with id {id}")]
    NotFound { collection: &'static str, id: Uuid },

    /// Insert collided with an existing primary key
    #[error("Duplicate {collection} row with id {id}")]
    Duplicate { collection: &'static str, id: Uuid },

    /// The backing service rejected or failed the request
    #[error("Record store backend error: {0}")]
    Backend(String),

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON for the expected tables
    #[error("Snapshot format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
