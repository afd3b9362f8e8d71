//! Common error types for relwatch

use thiserror::Error;

/// Common result type for relwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across relwatch crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input value (e.g. malformed date)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
