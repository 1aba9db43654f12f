//! Error types for poi-median
//!
//! Only the outer layers (config, CLI, server, remote fetch) produce these.
//! The classification and summary pipeline itself is total.

use thiserror::Error;

/// Main error type for poi-median operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for poi-median operations
pub type Result<T> = std::result::Result<T, Error>;
