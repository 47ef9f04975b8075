//! Error types for MCPBench

use thiserror::Error;

use crate::submission::ValidationError;

/// Result type alias using MCPBench Error
pub type Result<T> = std::result::Result<T, Error>;

/// MCPBench error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Infrastructure failure in the underlying store. Never client-correctable.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }
}
