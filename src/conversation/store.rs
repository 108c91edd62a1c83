use crate::models::QueryResponse;

use super::{reduce, Command, ConversationState, StoreError};

/// Owner of the current conversation snapshot.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: ConversationState,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Owned copy of the current snapshot for handing to another thread.
    pub fn snapshot(&self) -> ConversationState {
        self.state.clone()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.state.conversation_id.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight
    }

    /// Apply a command; on rejection the current snapshot is kept.
    pub fn apply(&mut self, command: Command) -> Result<(), StoreError> {
        match reduce(&self.state, command) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Conversation command rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn submit(&mut self, question: &str) -> Result<(), StoreError> {
        self.apply(Command::Submit(question.to_string()))
    }

    pub fn append_to_last(&mut self, text: &str) -> Result<(), StoreError> {
        self.apply(Command::AppendToLast(text.to_string()))
    }

    pub fn finalize_last(&mut self, response: QueryResponse) -> Result<(), StoreError> {
        self.apply(Command::FinalizeLast(response))
    }

    pub fn abort(&mut self, discard_partial: bool) -> Result<(), StoreError> {
        self.apply(Command::Abort { discard_partial })
    }

    pub fn reset(&mut self) {
        self.state = ConversationState::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_command_keeps_state() {
        let mut store = ConversationStore::new();
        store.submit("q").unwrap();
        let before = store.snapshot();

        assert_eq!(store.submit("again"), Err(StoreError::ExchangeInFlight));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_submit_then_reset() {
        let mut store = ConversationStore::new();
        store.submit("q").unwrap();
        assert!(store.in_flight());

        store.reset();
        assert!(!store.in_flight());
        assert!(store.state().is_empty());
        assert!(store.conversation_id().is_none());
    }
}
