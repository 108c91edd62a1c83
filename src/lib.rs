//! ClearPath - streaming conversation client for a question-answering API
//!
//! Answers arrive as a server-sent event stream. The crate decodes that
//! stream into typed events, folds them into conversation state, and polls
//! backend liveness on a bounded schedule alongside.
//!
//! - [`sse`] - Byte stream to frame payloads to [`sse::StreamEvent`]s
//! - [`dispatcher`] - Applies events to the conversation store
//! - [`conversation`] - Immutable snapshots and the reducer that replaces them
//! - [`session`] - Drives one exchange end to end
//! - [`health`] - Bounded background liveness polling

pub mod adapters;
pub mod client;
pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod health;
pub mod logging;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
