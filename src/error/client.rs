//! Errors returned by `QueryClient` operations.

use thiserror::Error;

use crate::traits::HttpError;

/// Error type for query client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or the connection broke
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Request or response body was not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

impl ClientError {
    /// Build a `ServerError` from a status code and response body. An empty
    /// body is replaced by `HTTP <status>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body.to_string()
        };
        ClientError::ServerError { status, message }
    }
}
