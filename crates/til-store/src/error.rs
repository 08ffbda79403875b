//! Error types for the table-store client.

use thiserror::Error;

/// Errors that can occur when talking to the table store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the table store.
    #[error("store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No row matched the requested id.
    #[error("fact not found: {id}")]
    NotFound { id: i64 },

    /// Invalid response from server.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot be used.
    #[error("invalid store URL: {0}")]
    InvalidBaseUrl(String),
}

/// Reasons a fact submission is rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("fact text is empty")]
    EmptyText,

    #[error("fact text is {len} characters, limit is {limit}")]
    TextTooLong { len: usize, limit: usize },

    #[error("source is not a valid URL: {0}")]
    InvalidSource(String),

    #[error("no category chosen")]
    MissingCategory,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
