//! Error types for the ClearPath client.
//!
//! - **Transport errors** (`HttpError`): raised by an [`HttpClient`](crate::traits::HttpClient)
//!   implementation when a request cannot be sent or a body stream breaks.
//! - **Client errors** (`ClientError`): failures of a single
//!   [`QueryClient`](crate::client::QueryClient) call, including non-success
//!   status codes and undecodable bodies.
//! - **Exchange errors** (`ExchangeError`): the outcome of a streamed exchange
//!   that reaches the user. Malformed frames never appear here; they are
//!   dropped during dispatch.

mod client;
mod exchange;

pub use crate::traits::HttpError;
pub use client::ClientError;
pub use exchange::{
    ExchangeError, GENERIC_SERVER_ERROR, INCOMPLETE_STREAM_ERROR, TRANSPORT_ERROR,
};
