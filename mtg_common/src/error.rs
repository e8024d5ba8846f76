//! Error types for card API access

use thiserror::Error;

/// Unified error type for Scryfall-facing operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, body decoding)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// API returned an error object
    #[error("{code}: {details}")]
    ApiResponse { code: String, details: String },
    /// HTTP error status code without a usable error body
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
