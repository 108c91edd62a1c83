//! Applies decoded stream events to the conversation store.
//!
//! One [`EventDispatcher`] lives for one exchange. It turns each frame into a
//! store command, decides when to stop reading, and settles the outcome once
//! the stream is exhausted.

use std::fmt;

use crate::conversation::ConversationStore;
use crate::error::ExchangeError;
use crate::models::QueryResponse;
use crate::sse::StreamEvent;

/// Whether the caller should keep reading frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// What happens to already-streamed text when a stream ends without a
/// terminating frame.
///
/// An empty placeholder is always removed. Error frames and transport
/// failures keep any text that arrived regardless of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialAnswerPolicy {
    /// Remove the unfinished assistant message
    #[default]
    Discard,
    /// Leave the partial text in place, unfinalized
    Keep,
}

/// Result of an exchange that finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSummary {
    /// Number of `chunk` frames applied, empty ones included
    pub chunks: usize,
    /// Frames dropped as unparseable or unrecognized
    pub dropped_frames: usize,
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Streaming,
    Completed(String),
    Failed(ExchangeError),
}

/// Per-exchange event dispatcher and completion bookkeeping.
#[derive(Debug)]
pub struct EventDispatcher {
    policy: PartialAnswerPolicy,
    chunks: usize,
    dropped_frames: usize,
    outcome: Outcome,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            policy: PartialAnswerPolicy::default(),
            chunks: 0,
            dropped_frames: 0,
            outcome: Outcome::Streaming,
        }
    }

    pub fn with_partial_policy(mut self, policy: PartialAnswerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// True once a `done` or `error` frame, or a transport failure, was handled.
    pub fn is_settled(&self) -> bool {
        self.outcome != Outcome::Streaming
    }

    /// Parse a raw frame payload and apply it.
    pub fn dispatch_payload(&mut self, store: &mut ConversationStore, payload: &str) -> Flow {
        self.apply(store, StreamEvent::parse(payload))
    }

    /// Apply one event to the store.
    pub fn apply(&mut self, store: &mut ConversationStore, event: StreamEvent) -> Flow {
        if self.is_settled() {
            return Flow::Stop;
        }

        match event {
            StreamEvent::Chunk { content } => {
                if let Err(e) = store.append_to_last(&content) {
                    tracing::warn!("Chunk arrived with no open placeholder: {}", e);
                    self.dropped_frames += 1;
                    return Flow::Continue;
                }
                self.chunks += 1;
                Flow::Continue
            }

            StreamEvent::Done {
                metadata,
                sources,
                conversation_id,
            } => {
                let answer = store
                    .state()
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                let response = QueryResponse {
                    answer,
                    metadata,
                    sources,
                    conversation_id: conversation_id.clone(),
                };

                if let Err(e) = store.finalize_last(response) {
                    tracing::warn!("Done arrived with no open placeholder: {}", e);
                    self.dropped_frames += 1;
                    return Flow::Continue;
                }

                tracing::info!(
                    conversation_id = %conversation_id,
                    chunks = self.chunks,
                    "Exchange completed"
                );
                self.outcome = Outcome::Completed(conversation_id);
                Flow::Stop
            }

            StreamEvent::Error { message } => {
                tracing::warn!(
                    "Server reported an error: {}",
                    message.as_deref().unwrap_or("<no message>")
                );
                // Partial text survives an explicit error frame; only an
                // empty bubble is removed.
                self.abort(store, false);
                self.outcome = Outcome::Failed(ExchangeError::ServerReported { message });
                Flow::Stop
            }

            StreamEvent::Unrecognized => {
                self.dropped_frames += 1;
                Flow::Continue
            }
        }
    }

    /// The request failed to send or the body broke mid-stream.
    ///
    /// Only an empty placeholder is removed; streamed text stays visible.
    pub fn fail_transport(
        &mut self,
        store: &mut ConversationStore,
        reason: impl fmt::Display,
    ) -> Flow {
        if self.is_settled() {
            return Flow::Stop;
        }

        tracing::warn!("Exchange transport failed: {}", reason);
        self.abort(store, false);
        self.outcome = Outcome::Failed(ExchangeError::Transport(reason.to_string()));
        Flow::Stop
    }

    /// Settle the exchange after the last frame was read.
    ///
    /// A stream that ended without `done` and without an earlier failure is
    /// reported as [`ExchangeError::Incomplete`].
    pub fn finish(self, store: &mut ConversationStore) -> Result<ExchangeSummary, ExchangeError> {
        match self.outcome {
            Outcome::Completed(conversation_id) => Ok(ExchangeSummary {
                chunks: self.chunks,
                dropped_frames: self.dropped_frames,
                conversation_id,
            }),
            Outcome::Failed(err) => Err(err),
            Outcome::Streaming => {
                tracing::warn!(chunks = self.chunks, "Stream ended without a done frame");
                let discard = self.policy == PartialAnswerPolicy::Discard;
                if store.in_flight() {
                    let _ = store.abort(discard);
                }
                Err(ExchangeError::Incomplete)
            }
        }
    }

    fn abort(&self, store: &mut ConversationStore, discard_partial: bool) {
        if store.in_flight() {
            let _ = store.abort(discard_partial);
        }
    }
}
