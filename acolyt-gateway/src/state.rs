use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use acolyt_core::{Config, KnowledgeSettings, Settings};
use acolyt_knowledge::{
    Embedder, EmbeddingClient, KnowledgeError, KnowledgeStore, Refresher, start_refresh_runner,
};

use crate::chat::history::ConversationStore;
use crate::chat::prompt::load_persona;
use crate::providers::{OpenAiCompatibleClient, Provider, ProviderError};
use crate::session::{ChatSession, SessionOptions};

/// Number of recent notes shown by the status command.
pub const STATUS_PREVIEW_NOTES: usize = 3;

/// Errors raised while wiring the application together
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Configuration error: {0}")]
    Config(#[from] acolyt_core::SecretsError),
    #[error("Knowledge store error: {0}")]
    Knowledge(#[from] KnowledgeError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Shared application state handed to every transport.
pub struct AppState {
    pub knowledge: Arc<KnowledgeStore>,
    pub refresher: Arc<Refresher>,
    pub session: Arc<ChatSession>,
    pub conversations: Arc<ConversationStore>,
    pub training_channel_id: Option<u64>,
    refresh_interval: Duration,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn new(
        settings: &Settings,
        knowledge_settings: &KnowledgeSettings,
        knowledge: Arc<KnowledgeStore>,
        embedder: Arc<dyn Embedder>,
        provider: Arc<dyn Provider>,
        persona: String,
    ) -> Self {
        let conversations = Arc::new(ConversationStore::with_max_users(
            settings.conversation.max_turns,
            settings.conversation.max_users,
        ));
        let refresher = Arc::new(Refresher::new(
            Arc::clone(&knowledge),
            Arc::clone(&embedder),
            knowledge_settings.embedding_timeout(),
        ));
        let options = SessionOptions {
            persona,
            top_k: knowledge_settings.retrieval.top_k,
            max_context_chars: knowledge_settings.retrieval.max_context_chars,
            history_token_budget: settings.conversation.history_token_budget,
            embed_timeout: knowledge_settings.embedding_timeout(),
            completion_timeout: Duration::from_secs(settings.completion.timeout_seconds.max(1)),
        };
        let session = Arc::new(ChatSession::new(
            Arc::clone(&knowledge),
            embedder,
            provider,
            Arc::clone(&conversations),
            options,
        ));

        Self {
            knowledge,
            refresher,
            session,
            conversations,
            training_channel_id: settings.discord.training_channel_id,
            refresh_interval: knowledge_settings.refresh_interval(),
        }
    }

    /// Build the production state: HTTP clients, persona and knowledge store.
    pub async fn from_config(config: &Config) -> Result<Self, StateError> {
        let knowledge_settings = config.knowledge_settings();
        let knowledge = Arc::new(KnowledgeStore::open(&knowledge_settings).await?);

        let embedder = EmbeddingClient::new(
            &knowledge_settings,
            config.embedding_api_key().map(str::to_string),
        );
        info!(
            model = embedder.model(),
            url = %knowledge_settings.embedding_url,
            "Embedding client created"
        );

        let completion = &config.settings.completion;
        let provider =
            OpenAiCompatibleClient::from_settings(completion, config.completion_api_key()?)?;
        info!(model = %completion.model, url = %completion.base_url, "Completion client created");

        let persona = load_persona(completion.persona_path.as_deref()).await;

        Ok(Self::new(
            &config.settings,
            &knowledge_settings,
            knowledge,
            Arc::new(embedder),
            Arc::new(provider),
            persona,
        ))
    }

    /// Start the periodic refresh. Runs immediately when notes exist but no
    /// chunks are loaded yet.
    pub async fn start_refresh_runner(&self) -> tokio::task::JoinHandle<()> {
        let has_notes = self
            .knowledge
            .read_notes_text()
            .await
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        let run_immediately = has_notes && self.knowledge.snapshot().is_empty();

        start_refresh_runner(
            Arc::clone(&self.refresher),
            self.refresh_interval,
            run_immediately,
        )
    }
}
