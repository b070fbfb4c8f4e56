//! Secrets configuration loaded from environment variables only.
//!
//! API keys and tokens never live in the TOML settings file.

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI (or compatible) API key, used for completions and embeddings (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,

    /// Discord bot token (env: DISCORD_BOT_TOKEN)
    pub discord_bot_token: Option<String>,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(String),

    #[error("No provider API key configured. Set OPENAI_API_KEY")]
    NoProviderConfigured,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Loads a `.env` file first if present (development convenience).
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let secrets = Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            discord_bot_token: non_empty_var("DISCORD_BOT_TOKEN"),
        };

        if secrets.openai_api_key.is_none() {
            return Err(SecretsError::NoProviderConfigured);
        }

        Ok(secrets)
    }

    /// Resolve an API key from an arbitrary env var name.
    ///
    /// Used when a settings section points at a custom `api_key_env`.
    pub fn resolve(&self, env_name: &str) -> Result<String, SecretsError> {
        if env_name == "OPENAI_API_KEY"
            && let Some(key) = &self.openai_api_key
        {
            return Ok(key.clone());
        }
        non_empty_var(env_name).ok_or_else(|| SecretsError::MissingSecret(env_name.to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
