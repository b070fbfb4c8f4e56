pub mod config;
pub mod message;

// Config re-exports
pub use config::{
    CompletionSettings, Config, ConfigError, ConversationSettings, DiscordSettings,
    KnowledgeFileSettings, KnowledgeSettings, LoggingSettings, RetrievalDefaults, Secrets,
    SecretsError, Settings, SettingsError,
};

// Message re-exports
pub use message::{MessageRole, PromptMessage};
