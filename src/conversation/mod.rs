//! Conversation state and the rules for changing it.
//!
//! State is an immutable snapshot ([`ConversationState`]) replaced wholesale by
//! the pure [`reduce`] function. [`ConversationStore`] holds the current
//! snapshot and is the only place visible conversation state changes.

mod state;
mod store;

pub use state::{reduce, Command, ConversationState, StoreError};
pub use store::ConversationStore;
