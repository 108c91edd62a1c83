//! One user's conversation with the backend.
//!
//! A [`Session`] owns the conversation store and drives each streamed
//! exchange to completion: submit, open the stream, dispatch frames, settle.
//! Exchanges are strictly sequential; `ask` borrows the session mutably for
//! the whole exchange.

use futures_util::StreamExt;

use crate::client::QueryClient;
use crate::conversation::{ConversationState, ConversationStore};
use crate::dispatcher::{EventDispatcher, ExchangeSummary, Flow, PartialAnswerPolicy};
use crate::error::ExchangeError;
use crate::models::QueryRequest;
use crate::traits::HttpClient;

pub struct Session<C: HttpClient> {
    client: QueryClient<C>,
    store: ConversationStore,
    policy: PartialAnswerPolicy,
    last_error: Option<String>,
}

impl<C: HttpClient> Session<C> {
    pub fn new(client: QueryClient<C>) -> Self {
        Self {
            client,
            store: ConversationStore::new(),
            policy: PartialAnswerPolicy::default(),
            last_error: None,
        }
    }

    pub fn with_partial_policy(mut self, policy: PartialAnswerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &ConversationState {
        self.store.state()
    }

    /// User-visible text for the most recent failed exchange.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a fresh conversation.
    pub fn reset(&mut self) {
        self.store.reset();
        self.last_error = None;
        tracing::info!("Conversation reset");
    }

    /// Run one exchange.
    ///
    /// `on_update` is called with the new snapshot after every change: once
    /// after the submission, after each applied frame, and once when the
    /// exchange settles. A rejected submission sends nothing and calls it
    /// never.
    pub async fn ask<F>(
        &mut self,
        question: &str,
        mut on_update: F,
    ) -> Result<ExchangeSummary, ExchangeError>
    where
        F: FnMut(&ConversationState),
    {
        let conversation_id = self.store.conversation_id().map(str::to_string);
        self.store.submit(question)?;
        self.last_error = None;
        on_update(self.store.state());

        let request = QueryRequest::with_conversation(question.trim(), conversation_id);
        let mut dispatcher = EventDispatcher::new().with_partial_policy(self.policy);

        match self.client.stream_query(&request).await {
            Ok(mut payloads) => {
                while let Some(item) = payloads.next().await {
                    let flow = match item {
                        Ok(payload) => dispatcher.dispatch_payload(&mut self.store, &payload),
                        Err(e) => dispatcher.fail_transport(&mut self.store, e),
                    };
                    on_update(self.store.state());
                    if flow == Flow::Stop {
                        break;
                    }
                }
            }
            Err(e) => {
                dispatcher.fail_transport(&mut self.store, e);
            }
        }

        let settled = dispatcher.is_settled();
        let result = dispatcher.finish(&mut self.store);
        if !settled {
            on_update(self.store.state());
        }

        if let Err(e) = &result {
            self.last_error = e.user_message();
        }
        result
    }
}
