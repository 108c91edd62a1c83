//! SSE payload deserialization structs
//!
//! Internal shapes of the JSON carried on `data:` lines. Required fields are
//! left without serde defaults so a frame missing one fails to deserialize.

use serde::Deserialize;

use crate::models::{Metadata, Source};

/// `{"type": "chunk", "content": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkPayload {
    pub content: String,
}

/// `{"type": "done", "metadata": {...}, "sources": [...], "conversation_id": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DonePayload {
    pub metadata: Metadata,
    pub sources: Vec<Source>,
    #[serde(alias = "conversationId")]
    pub conversation_id: String,
}
