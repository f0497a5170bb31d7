//! Error types for Pristine connections

use thiserror::Error;

/// Core error type for connection-layer operations
#[derive(Error, Debug)]
pub enum PristineError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for connection-layer operations
pub type Result<T> = std::result::Result<T, PristineError>;
