//! User-visible outcome of a failed exchange.

use thiserror::Error;

use crate::conversation::StoreError;
use crate::traits::HttpError;

/// Shown when the request could not be sent or the body broke mid-stream.
pub const TRANSPORT_ERROR: &str = "Request failed. Please try again.";

/// Shown for an `error` frame that carried no message.
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong while generating the answer.";

/// Shown when the stream ended without a `done` frame.
pub const INCOMPLETE_STREAM_ERROR: &str =
    "The response was interrupted before it finished. Please try again.";

/// Why an exchange did not finalize.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExchangeError {
    /// Submission refused by the conversation store; nothing was sent
    #[error("Submission rejected: {0}")]
    Rejected(#[from] StoreError),

    /// Request failed to send, or the body stream broke
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server sent an explicit `error` frame
    #[error("Server reported an error: {}", .message.as_deref().unwrap_or(GENERIC_SERVER_ERROR))]
    ServerReported { message: Option<String> },

    /// The stream ended with no valid `done` frame
    #[error("Stream ended before completion")]
    Incomplete,
}

impl ExchangeError {
    /// Text surfaced to the user for this outcome.
    ///
    /// `Rejected` submissions are not surfaced and return `None`.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ExchangeError::Rejected(_) => None,
            ExchangeError::Transport(_) => Some(TRANSPORT_ERROR.to_string()),
            ExchangeError::ServerReported { message } => Some(
                message
                    .clone()
                    .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
            ),
            ExchangeError::Incomplete => Some(INCOMPLETE_STREAM_ERROR.to_string()),
        }
    }
}

impl From<HttpError> for ExchangeError {
    fn from(err: HttpError) -> Self {
        ExchangeError::Transport(err.to_string())
    }
}
