use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use acolyt_knowledge::{Embedder, KnowledgeStore, NO_CONTEXT, assemble, top_k};

use crate::chat::history::ConversationStore;
use crate::chat::prompt::{DEFAULT_PERSONA, build_prompt};
use crate::chat::token_budget::trim_history_to_budget;
use crate::providers::{Provider, ProviderError};

/// Reply shown to the user when a query fails.
pub const APOLOGY: &str = "Something went wrong. Please try again.";

/// Errors that can occur while answering a query
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Message is empty")]
    EmptyMessage,
}

/// Tuning for a [`ChatSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub persona: String,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub history_token_budget: u32,
    pub embed_timeout: Duration,
    pub completion_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            top_k: 2,
            max_context_chars: 4000,
            history_token_budget: 6000,
            embed_timeout: Duration::from_secs(30),
            completion_timeout: Duration::from_secs(120),
        }
    }
}

/// Answers user questions: retrieve context, merge history, complete, record.
///
/// This is the single entry point transports call; it owns no transport
/// details.
pub struct ChatSession {
    knowledge: Arc<KnowledgeStore>,
    embedder: Arc<dyn Embedder>,
    provider: Arc<dyn Provider>,
    conversations: Arc<ConversationStore>,
    options: SessionOptions,
}

impl ChatSession {
    pub fn new(
        knowledge: Arc<KnowledgeStore>,
        embedder: Arc<dyn Embedder>,
        provider: Arc<dyn Provider>,
        conversations: Arc<ConversationStore>,
        options: SessionOptions,
    ) -> Self {
        Self {
            knowledge,
            embedder,
            provider,
            conversations,
            options,
        }
    }

    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    /// Context block for `text`. Never fails: an empty store or an embedding
    /// failure yields [`NO_CONTEXT`].
    pub async fn relevant_context(&self, text: &str) -> String {
        let snapshot = self.knowledge.snapshot();
        if snapshot.is_empty() {
            return NO_CONTEXT.to_string();
        }

        let embedded =
            tokio::time::timeout(self.options.embed_timeout, self.embedder.embed(text)).await;
        let query = match embedded {
            Ok(Ok(vector)) => vector,
            Ok(Err(err)) => {
                warn!(error = %err, "Query embedding failed, answering without context");
                return NO_CONTEXT.to_string();
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.options.embed_timeout.as_millis() as u64,
                    "Query embedding timed out, answering without context"
                );
                return NO_CONTEXT.to_string();
            }
        };

        let matches = top_k(&query, snapshot.chunks(), self.options.top_k);
        assemble(&matches, self.options.max_context_chars)
    }

    /// Answer `text` for `user_id` and record the exchange.
    ///
    /// Queries from the same user are serialized; on failure nothing is
    /// recorded.
    pub async fn ask(&self, user_id: &str, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut history = self.conversations.lock(user_id).await;

        let context = self.relevant_context(text).await;
        let turns = history.to_vec();
        let window = trim_history_to_budget(&turns, self.options.history_token_budget);
        let messages = build_prompt(&self.options.persona, &context, window, text);

        info!(
            event_kind = "chat_io",
            user_id,
            history_turns = window.len(),
            provider = self.provider.name(),
            model = self.provider.model(),
            "Query: {}",
            text
        );

        let timeout = self.options.completion_timeout;
        let reply = tokio::time::timeout(timeout, self.provider.complete(&messages))
            .await
            .map_err(|_| ProviderError::Timeout(timeout))??;

        history.record_exchange(text, reply.clone());

        info!(event_kind = "chat_io", user_id, "Reply: {}", reply);
        Ok(reply)
    }
}
