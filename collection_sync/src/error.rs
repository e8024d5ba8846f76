//! Error types for collection_sync

use mtg_common::ApiError;
use thiserror::Error;

/// Unified error type for collection_sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Scryfall request failed
    #[error(transparent)]
    Api(#[from] ApiError),
    /// HTTP request to the remote store or rate source failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to read or write delimited data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse or build a JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Remote file content was not valid base64 / UTF-8
    #[error("Failed to decode remote content: {0}")]
    Decode(String),
    /// Remote store answered with a non-success status
    #[error("Remote store error ({status}): {message}")]
    Store {
        status: reqwest::StatusCode,
        message: String,
    },
    /// Remote collection file does not exist yet
    #[error("Remote collection file not found: {0}")]
    MissingRemote(String),
    /// Requested card is not in the collection
    #[error("Card not in collection: {0}")]
    NotFound(String),
    /// Edit attempted without authorization
    #[error("Editing requires authorization")]
    Unauthorized,
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<base64::DecodeError> for SyncError {
    fn from(err: base64::DecodeError) -> Self {
        SyncError::Decode(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for SyncError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

/// Result alias for collection_sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
