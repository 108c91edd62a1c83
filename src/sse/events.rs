//! Typed protocol events carried by stream frames.

use serde_json::Value;

use crate::models::{Metadata, Source};
use crate::sse::payloads::{ChunkPayload, DonePayload};

/// One decoded frame.
///
/// `Unrecognized` covers every payload that is not a well-formed `chunk`,
/// `done` or `error` frame: invalid JSON, a missing or unknown `type`, or a
/// missing required field. Those frames are dropped by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental answer text (may be empty)
    Chunk { content: String },
    /// Exchange finished successfully
    Done {
        metadata: Metadata,
        sources: Vec<Source>,
        conversation_id: String,
    },
    /// Backend reported a failure; `message` is absent when none was sent
    Error { message: Option<String> },
    /// Anything else
    Unrecognized,
}

impl StreamEvent {
    /// Parse a frame payload. Never fails; bad input becomes `Unrecognized`.
    pub fn parse(payload: &str) -> Self {
        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Dropping frame with invalid JSON: {}", e);
                return StreamEvent::Unrecognized;
            }
        };

        let event_type = value.get("type").and_then(Value::as_str).unwrap_or("");
        match event_type {
            "chunk" => parse_chunk_event(value),
            "done" => parse_done_event(value),
            "error" => parse_error_event(&value),
            other => {
                tracing::debug!("Dropping frame with unrecognized type {:?}", other);
                StreamEvent::Unrecognized
            }
        }
    }
}

fn parse_chunk_event(value: Value) -> StreamEvent {
    match serde_json::from_value::<ChunkPayload>(value) {
        Ok(payload) => StreamEvent::Chunk {
            content: payload.content,
        },
        Err(e) => {
            tracing::debug!("Dropping malformed chunk frame: {}", e);
            StreamEvent::Unrecognized
        }
    }
}

fn parse_done_event(value: Value) -> StreamEvent {
    match serde_json::from_value::<DonePayload>(value) {
        Ok(payload) => StreamEvent::Done {
            metadata: payload.metadata,
            sources: payload.sources,
            conversation_id: payload.conversation_id,
        },
        Err(e) => {
            tracing::debug!("Dropping malformed done frame: {}", e);
            StreamEvent::Unrecognized
        }
    }
}

// The message is optional and loosely typed; a blank or non-string message
// falls back to the generic text downstream.
fn parse_error_event(value: &Value) -> StreamEvent {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    StreamEvent::Error { message }
}
