//! Common test utilities for integration tests.
//!
//! Frame builders produce bodies in the exact wire format the backend
//! streams; `mocks` mounts them on a wiremock server.
//!
//! # Example
//!
//! ```ignore
//! use common::{chunk_frame, done_frame, sse_body};
//!
//! let body = sse_body(&[chunk_frame("Hi"), done_frame("c1")]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use clearpath::adapters::ReqwestHttpClient;
use clearpath::client::QueryClient;
use clearpath::session::Session;
use serde_json::json;

/// `data: {"type":"chunk",...}` followed by the frame boundary.
pub fn chunk_frame(content: &str) -> String {
    frame(&json!({"type": "chunk", "content": content}))
}

/// A `done` frame with realistic metadata and one source.
pub fn done_frame(conversation_id: &str) -> String {
    frame(&json!({
        "type": "done",
        "metadata": {
            "model_used": "claude-haiku",
            "classification": "simple",
            "tokens": {"input_tokens": 120, "output_tokens": 18},
            "latency_ms": 840,
            "chunks_retrieved": 3,
            "evaluator_flags": [],
            "evaluator_message": null,
            "cache_hit": false
        },
        "sources": [
            {"document": "billing-faq.pdf", "page": 2, "relevance_score": 0.91}
        ],
        "conversation_id": conversation_id
    }))
}

pub fn error_frame(message: &str) -> String {
    frame(&json!({"type": "error", "message": message}))
}

pub fn frame(payload: &serde_json::Value) -> String {
    format!("data: {}\n\n", payload)
}

pub fn sse_body(frames: &[String]) -> String {
    frames.concat()
}

/// A session talking to `base_url` over real HTTP.
pub fn http_session(base_url: &str) -> Session<ReqwestHttpClient> {
    Session::new(QueryClient::new(ReqwestHttpClient::new(), base_url))
}
