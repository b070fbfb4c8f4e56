//! Configuration management for acolyt.
//!
//! This module separates secrets (from environment variables) from
//! settings (from a TOML file).
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - completion and embedding API key
//! - `DISCORD_BOT_TOKEN` - Discord bot token
//!
//! ## Settings (TOML File)
//! Located at `~/.config/acolyt/config.toml`:
//! ```toml
//! [completion]
//! model = "gpt-4"
//!
//! [knowledge]
//! embedding_model = "text-embedding-3-small"
//! top_k = 2
//!
//! [discord]
//! enabled = true
//! training_channel_id = 1370404171697623120
//! ```

pub mod knowledge;
mod secrets;
mod settings;

pub use knowledge::{KnowledgeSettings, RetrievalDefaults};
pub use secrets::{Secrets, SecretsError};
pub use settings::{
    CompletionSettings, ConversationSettings, DiscordSettings, KnowledgeFileSettings,
    LoggingSettings, Settings, SettingsError,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Completion model is not set")]
    CompletionModelNotSet,

    #[error("Embedding model is not set")]
    EmbeddingModelNotSet,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No provider API key is configured
    /// - A custom `api_key_env` points at an unset variable
    /// - The TOML file cannot be read or parsed
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        let config = Self { secrets, settings };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.completion.model.trim().is_empty() {
            return Err(ConfigError::CompletionModelNotSet);
        }
        if self
            .settings
            .knowledge
            .embedding_model
            .as_deref()
            .is_some_and(|model| model.trim().is_empty())
        {
            return Err(ConfigError::EmbeddingModelNotSet);
        }
        self.completion_api_key()?;
        Ok(())
    }

    /// API key for the completion provider (custom env var or `OPENAI_API_KEY`).
    pub fn completion_api_key(&self) -> Result<String, SecretsError> {
        let env_name = self
            .settings
            .completion
            .api_key_env
            .as_deref()
            .unwrap_or("OPENAI_API_KEY");
        self.secrets.resolve(env_name)
    }

    /// API key for the embedding provider.
    pub fn embedding_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }

    /// Resolved knowledge settings.
    pub fn knowledge_settings(&self) -> KnowledgeSettings {
        KnowledgeSettings::from(&self.settings.knowledge)
    }

    /// Get the Discord bot token (if configured).
    pub fn discord_bot_token(&self) -> Option<&str> {
        self.secrets.discord_bot_token.as_deref()
    }

    /// Check if Discord bot is enabled and has a token.
    pub fn discord_enabled(&self) -> bool {
        self.settings.discord.enabled && self.secrets.discord_bot_token.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests that modify environment variables must not run concurrently
    pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        unsafe {
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("DISCORD_BOT_TOKEN");
            env::remove_var("ACOLYT_LOCAL_KEY");
        }
    }

    #[test]
    fn test_discord_enabled() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("DISCORD_BOT_TOKEN", "token");
        }

        let secrets = Secrets::from_env_inner().unwrap();
        let mut settings = Settings::default();

        settings.discord.enabled = false;
        let config = Config {
            secrets: secrets.clone(),
            settings: settings.clone(),
        };
        assert!(!config.discord_enabled());

        settings.discord.enabled = true;
        let config = Config { secrets, settings };
        assert!(config.discord_enabled());
        assert_eq!(config.discord_bot_token(), Some("token"));
    }

    #[test]
    fn test_completion_key_uses_custom_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("ACOLYT_LOCAL_KEY", "sk-local");
        }

        let secrets = Secrets::from_env_inner().unwrap();
        let mut settings = Settings::default();
        settings.completion.api_key_env = Some("ACOLYT_LOCAL_KEY".to_string());
        let config = Config { secrets, settings };

        assert_eq!(config.completion_api_key().unwrap(), "sk-local");
        assert_eq!(config.embedding_api_key(), Some("sk-test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe { env::set_var("OPENAI_API_KEY", "sk-test") }

        let secrets = Secrets::from_env_inner().unwrap();
        let mut settings = Settings::default();
        settings.completion.model = "  ".to_string();
        let config = Config { secrets, settings };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::CompletionModelNotSet)
        ));
    }

    #[test]
    fn test_knowledge_settings_resolved() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe { env::set_var("OPENAI_API_KEY", "sk-test") }

        let secrets = Secrets::from_env_inner().unwrap();
        let mut settings = Settings::default();
        settings.knowledge.top_k = Some(7);
        let config = Config { secrets, settings };

        let knowledge = config.knowledge_settings();
        assert_eq!(knowledge.retrieval.top_k, 7);
        assert_eq!(knowledge.embedding_model, "text-embedding-3-small");
    }
}
