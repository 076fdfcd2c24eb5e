//! Error types for folio.

use thiserror::Error;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store has no credentials or client; it was never attempted
    #[error("Remote store not configured")]
    NotConfigured,

    /// Remote store was attempted and failed (network, auth, validation)
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local persistence refused the write because of its size limit
    #[error("Storage quota exceeded writing {key}: {bytes} bytes over a {quota} byte quota")]
    QuotaExceeded {
        key: String,
        bytes: usize,
        quota: usize,
    },

    /// Local storage backend failed for a reason other than quota
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the remote store, which callers degrade from
    /// instead of surfacing.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::NotConfigured | Error::RemoteUnavailable(_))
    }

    /// True when local persistence ran out of space.
    pub fn is_quota(&self) -> bool {
        matches!(self, Error::QuotaExceeded { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::RemoteUnavailable(e.to_string())
    }
}
