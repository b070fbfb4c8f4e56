//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration stored in the XDG config directory
//! (`~/.config/acolyt/config.toml`, or `$ACOLYT_CONFIG_DIR/config.toml`).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# acolyt configuration file
# Located at: ~/.config/acolyt/config.toml
#
# Secrets are loaded from environment variables:
#   - OPENAI_API_KEY
#   - DISCORD_BOT_TOKEN

[completion]
base_url = "https://api.openai.com/v1"
model = "gpt-4"
max_tokens = 1024
timeout_seconds = 60
# api_key_env = "OPENAI_API_KEY"
# persona_path = "/path/to/persona.md"

[knowledge]
embedding_url = "https://api.openai.com/v1"
embedding_model = "text-embedding-3-small"
embedding_timeout_seconds = 30
refresh_minutes = 15
top_k = 2
max_context_chars = 4000
# embedding_dim = 1536
# notes_path = "/path/to/training-notes.md"
# embeds_path = "/path/to/signal-embeds.json"

[conversation]
max_turns = 20
history_token_budget = 6000
max_users = 10000

[discord]
enabled = true
# training_channel_id = 1370404171697623120

[logging]
level = "info"
"#;

/// Settings loaded from TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Completion (chat model) settings
    #[serde(default)]
    pub completion: CompletionSettings,

    /// Knowledge store and retrieval settings
    #[serde(default)]
    pub knowledge: KnowledgeFileSettings,

    /// Per-user conversation history settings
    #[serde(default)]
    pub conversation: ConversationSettings,

    /// Discord bot configuration
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Chat completion provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionSettings {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Maximum tokens generated per reply
    #[serde(default = "default_completion_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for a single completion call
    #[serde(default = "default_completion_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Optional env var name used to resolve the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Optional file replacing the built-in persona prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_path: Option<String>,
}

/// Knowledge settings as written by the user (every field optional).
///
/// Resolved into [`super::KnowledgeSettings`] via `From`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KnowledgeFileSettings {
    /// Embedding provider base URL
    pub embedding_url: Option<String>,

    /// Embedding model name
    pub embedding_model: Option<String>,

    /// Embedding dimension (if known)
    pub embedding_dim: Option<usize>,

    /// Upper bound for a single embedding call
    pub embedding_timeout_seconds: Option<u64>,

    /// Refresh interval in minutes
    pub refresh_minutes: Option<u64>,

    /// Number of chunks fed into the prompt
    pub top_k: Option<usize>,

    /// Character budget of the assembled context block
    pub max_context_chars: Option<usize>,

    /// Override for the note log path
    pub notes_path: Option<String>,

    /// Override for the chunk-embedding file path
    pub embeds_path: Option<String>,
}

/// Conversation history settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversationSettings {
    /// Maximum number of turns (user + assistant) kept per user
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Estimated token budget for history included in one prompt
    #[serde(default = "default_history_token_budget")]
    pub history_token_budget: u32,

    /// Histories kept in memory; the least recently active idle user is
    /// dropped beyond this
    #[serde(default = "default_max_users")]
    pub max_users: usize,
}

/// Discord bot settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordSettings {
    /// Whether Discord bot is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Messages posted in this channel are appended to the note log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_channel_id: Option<u64>,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-4".to_string()
}

fn default_completion_max_tokens() -> u32 {
    1024
}

fn default_completion_timeout_seconds() -> u64 {
    60
}

fn default_max_turns() -> usize {
    20
}

fn default_history_token_budget() -> u32 {
    6000
}

fn default_max_users() -> usize {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_completion_model(),
            max_tokens: default_completion_max_tokens(),
            timeout_seconds: default_completion_timeout_seconds(),
            api_key_env: None,
            persona_path: None,
        }
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            history_token_budget: default_history_token_budget(),
            max_users: default_max_users(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Serialize settings to TOML content.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/acolyt/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("ACOLYT_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("acolyt");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Save settings to a specific file path.
    pub fn save_to_path(&self, path: &PathBuf) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }
}
