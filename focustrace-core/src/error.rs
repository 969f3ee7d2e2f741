//! Error types for focustrace-core

use thiserror::Error;

/// Main error type for the focustrace-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Event rejected before any storage write
    #[error("validation error: {0}")]
    Validation(String),

    /// Metrics write lost too many compare-and-swap rounds
    #[error("metrics update conflict for user {user_id}")]
    Conflict { user_id: String },
}

/// Result type alias for focustrace-core
pub type Result<T> = std::result::Result<T, Error>;
