//! Storage error types.

use thiserror::Error;

use crate::sink::EventId;

/// Result type for sink operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store cannot be reached.
    #[error("Persistence sink unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(EventId),
}
