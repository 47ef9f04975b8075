//! MCPBench Common Library
//!
//! Submission model, validation and persistence shared by the MCPBench web
//! harness and its test tooling.

pub mod db;
pub mod error;
pub mod store;
pub mod submission;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use store::{parse_submission_id, CreatedSubmission, SqliteSubmissionStore, SubmissionStore};
pub use submission::{
    validate_submission, CustomerSubmission, DeliveryWindow, FieldViolation, NewSubmission, Size,
    ValidationError, ViolationKind,
};

/// MCPBench version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".mcpbench")
}

/// Default database path
pub fn default_db_path() -> std::path::PathBuf {
    default_store_path().join("submissions.db")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
