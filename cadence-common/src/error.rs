//! Common error types for Cadence

use thiserror::Error;

/// Common result type for Cadence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Cadence crates
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown track id, preset name, playlist or other lookup key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier inserted twice without an explicit overwrite
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Field name not supported on a generic update path
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for lookup failures (`NotFound`)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
