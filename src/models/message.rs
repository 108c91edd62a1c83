use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryResponse;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry of the visible conversation.
///
/// Assistant messages start as an empty placeholder, accumulate streamed text
/// in `content`, and carry the full `response` once the exchange finalizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<QueryResponse>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            response: None,
            created_at: Utc::now(),
        }
    }

    /// Empty assistant message awaiting streamed content.
    pub fn placeholder() -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            response: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// An assistant message with no streamed text and no finalized response.
    pub fn is_empty_placeholder(&self) -> bool {
        self.is_assistant() && self.content.is_empty() && self.response.is_none()
    }

    pub fn is_finalized(&self) -> bool {
        self.response.is_some()
    }
}
