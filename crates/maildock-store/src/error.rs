//! Error types for the account directory.

use thiserror::Error;

use crate::account::ValidationError;

/// Errors that can occur while loading the directory.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An account entry failed validation.
    #[error("Invalid account {username:?}: {reason}")]
    InvalidAccount {
        /// Username of the offending entry.
        username: String,
        /// What is wrong with it.
        reason: ValidationError,
    },

    /// A stored message cannot be served.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
