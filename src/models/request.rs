use serde::{Deserialize, Serialize};

/// Body of `POST /query` and `POST /query/stream`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// The question, already trimmed by the caller
    pub question: String,
    /// Present only once an earlier exchange in this session completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl QueryRequest {
    /// Request that starts a new conversation
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            conversation_id: None,
        }
    }

    /// Request that continues an existing conversation
    pub fn with_conversation(question: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            question: question.into(),
            conversation_id,
        }
    }
}
