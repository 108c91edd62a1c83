//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming POST)
//! - [`HealthProbe`] - One liveness check, polled by the health monitor

pub mod health;
pub mod http;

pub use health::HealthProbe;
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
