//! Pure reducer over conversation snapshots.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{Message, QueryResponse};

/// Snapshot of the visible conversation.
///
/// Messages are shared behind `Arc`, so cloning a snapshot is cheap and every
/// message a command does not touch stays the same allocation in the next
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Arc<Message>>,
    /// Server-assigned id; `None` until the first exchange finalizes
    pub conversation_id: Option<String>,
    /// An exchange has been submitted and not yet finalized or aborted
    pub in_flight: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last message, if it is an assistant message still open for streaming.
    fn open_placeholder(&self) -> Option<&Message> {
        self.last().filter(|m| m.is_assistant() && !m.is_finalized())
    }
}

/// State transitions accepted by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a user message and an empty assistant placeholder
    Submit(String),
    /// Concatenate streamed text onto the placeholder
    AppendToLast(String),
    /// Attach the final response and adopt its conversation id
    FinalizeLast(QueryResponse),
    /// End the exchange without finalizing. The placeholder is removed when
    /// empty, or unconditionally when `discard_partial` is set.
    Abort { discard_partial: bool },
    /// Clear messages and conversation id, cancelling any exchange in flight
    Reset,
}

/// Reasons a command is rejected. A rejected command leaves state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("an exchange is already in flight")]
    ExchangeInFlight,
    #[error("no exchange is in flight")]
    NoExchangeInFlight,
    #[error("last message is not an open assistant placeholder")]
    NoPlaceholder,
}

/// Apply `command` to `state`, producing the next snapshot.
pub fn reduce(
    state: &ConversationState,
    command: Command,
) -> Result<ConversationState, StoreError> {
    match command {
        Command::Submit(question) => {
            let question = question.trim();
            if question.is_empty() {
                return Err(StoreError::EmptyQuestion);
            }
            if state.in_flight {
                return Err(StoreError::ExchangeInFlight);
            }

            let mut next = state.clone();
            next.messages.push(Arc::new(Message::user(question)));
            next.messages.push(Arc::new(Message::placeholder()));
            next.in_flight = true;
            Ok(next)
        }

        Command::AppendToLast(text) => {
            let placeholder = open_placeholder(state)?;

            let mut updated = placeholder.clone();
            updated.content.push_str(&text);
            Ok(replace_last(state, updated))
        }

        Command::FinalizeLast(response) => {
            let placeholder = open_placeholder(state)?;

            let conversation_id = response.conversation_id.clone();
            let mut updated = placeholder.clone();
            updated.response = Some(response);

            let mut next = replace_last(state, updated);
            next.conversation_id = Some(conversation_id);
            next.in_flight = false;
            Ok(next)
        }

        Command::Abort { discard_partial } => {
            if !state.in_flight {
                return Err(StoreError::NoExchangeInFlight);
            }

            let mut next = state.clone();
            let remove = next
                .open_placeholder()
                .map_or(false, |m| discard_partial || m.content.is_empty());
            if remove {
                next.messages.pop();
            }
            next.in_flight = false;
            Ok(next)
        }

        Command::Reset => Ok(ConversationState::new()),
    }
}

fn open_placeholder(state: &ConversationState) -> Result<&Message, StoreError> {
    if !state.in_flight {
        return Err(StoreError::NoExchangeInFlight);
    }
    state.open_placeholder().ok_or(StoreError::NoPlaceholder)
}

// Tail-only replacement: earlier entries are shared, not copied.
fn replace_last(state: &ConversationState, last: Message) -> ConversationState {
    let mut next = state.clone();
    if let Some(slot) = next.messages.last_mut() {
        *slot = Arc::new(last);
    }
    next
}
