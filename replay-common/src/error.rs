//! Common error types for Replay

use thiserror::Error;

/// Common result type for Replay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Replay crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Spotify authentication failure (401/403, bad refresh token)
    #[error("Spotify auth error: {0}")]
    Auth(String),

    /// Spotify API failure other than authentication
    #[error("Spotify API error: {0}")]
    Api(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
