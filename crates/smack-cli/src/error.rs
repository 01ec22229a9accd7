//! Error types for smack-cli

use thiserror::Error;

/// Result type alias for smack-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in smack-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from smack-rules
    #[error(transparent)]
    Rules(#[from] smack_rules::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON output error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Terminal output error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }
}
