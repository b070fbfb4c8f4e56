//! Shared helpers for integration tests: in-process embedder and provider.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use acolyt_core::{MessageRole, PromptMessage};
use acolyt_gateway::chat::history::ConversationStore;
use acolyt_gateway::providers::{Provider, ProviderError};
use acolyt_gateway::session::{ChatSession, SessionOptions};
use acolyt_knowledge::{Embedder, KnowledgeError, KnowledgeResult, KnowledgeStore};

/// Maps text onto two axes: "stake" questions point along x, everything
/// else along y.
pub struct KeywordEmbedder {
    pub fail: bool,
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        if self.fail {
            return Err(KnowledgeError::Embedding("embedding service down".to_string()));
        }
        if text.to_lowercase().contains("stak") {
            Ok(vec![1.0, 0.0])
        } else {
            Ok(vec![0.0, 1.0])
        }
    }
}

/// Replies `"re: {question}"` after an optional delay and records every
/// prompt it receives.
pub struct EchoProvider {
    pub delay: Duration,
    pub fail: bool,
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl EchoProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn prompts(&self) -> Vec<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ProviderError::ApiError {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(format!("re: {question}"))
    }
}

pub fn store_in(dir: &Path) -> Arc<KnowledgeStore> {
    Arc::new(KnowledgeStore::new(
        dir.join("knowledge").join("training-notes.md"),
        dir.join("signal-embeds.json"),
        None,
    ))
}

pub fn session(
    store: Arc<KnowledgeStore>,
    embedder: Arc<dyn Embedder>,
    provider: Arc<dyn Provider>,
    options: SessionOptions,
) -> ChatSession {
    ChatSession::new(
        store,
        embedder,
        provider,
        Arc::new(ConversationStore::new(20)),
        options,
    )
}

pub fn test_options() -> SessionOptions {
    SessionOptions {
        persona: "You are a test persona.".to_string(),
        ..SessionOptions::default()
    }
}
