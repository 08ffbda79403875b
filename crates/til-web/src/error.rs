//! Error types for the web UI.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur in the web UI.
///
/// Store failures never reach this type: they are folded into the page as a
/// banner or alert by the feed.
#[derive(Debug, Error)]
pub enum WebError {
    /// Category in the query string is not one of the known ones.
    #[error(transparent)]
    UnknownCategory(#[from] til_store::UnknownCategory),

    /// Vote path names no vote column.
    #[error(transparent)]
    UnknownVoteField(#[from] til_store::UnknownVoteField),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
