//! Knowledge system configuration types.
//!
//! These types define the resolved (non-optional) settings used by
//! `acolyt-knowledge`. They are created from the user-facing
//! `KnowledgeFileSettings` TOML struct via `From`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::settings::KnowledgeFileSettings;

/// Resolved knowledge settings (all values filled with defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub embedding_dim: Option<usize>,
    #[serde(default = "default_embedding_timeout_seconds")]
    pub embedding_timeout_seconds: u64,
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
    #[serde(default)]
    pub retrieval: RetrievalDefaults,
    #[serde(default)]
    pub notes_path_override: Option<PathBuf>,
    #[serde(default)]
    pub embeds_path_override: Option<PathBuf>,
    /// Override the root data directory for all knowledge paths.
    /// When set, the note log and chunk file derive from this root instead
    /// of `ACOLYT_DATA_DIR` / XDG. Primarily for testing.
    #[serde(default)]
    pub data_root_override: Option<PathBuf>,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            embedding_url: default_embedding_url(),
            embedding_model: default_embedding_model(),
            embedding_dim: None,
            embedding_timeout_seconds: default_embedding_timeout_seconds(),
            refresh_minutes: default_refresh_minutes(),
            retrieval: RetrievalDefaults::default(),
            notes_path_override: None,
            embeds_path_override: None,
            data_root_override: None,
        }
    }
}

impl KnowledgeSettings {
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_seconds.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes.max(1) * 60)
    }
}

/// Resolved retrieval tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalDefaults {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_embedding_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_timeout_seconds() -> u64 {
    30
}

fn default_refresh_minutes() -> u64 {
    15
}

fn default_top_k() -> usize {
    2
}

fn default_max_context_chars() -> usize {
    4000
}

impl From<&KnowledgeFileSettings> for KnowledgeSettings {
    fn from(value: &KnowledgeFileSettings) -> Self {
        let mut settings = KnowledgeSettings::default();
        if let Some(url) = &value.embedding_url {
            settings.embedding_url = url.clone();
        }
        if let Some(model) = &value.embedding_model {
            settings.embedding_model = model.clone();
        }
        if let Some(dim) = value.embedding_dim {
            settings.embedding_dim = Some(dim);
        }
        if let Some(seconds) = value.embedding_timeout_seconds {
            settings.embedding_timeout_seconds = seconds;
        }
        if let Some(minutes) = value.refresh_minutes {
            settings.refresh_minutes = minutes;
        }
        if let Some(top_k) = value.top_k {
            settings.retrieval.top_k = top_k;
        }
        if let Some(max_chars) = value.max_context_chars {
            settings.retrieval.max_context_chars = max_chars;
        }
        if let Some(path) = &value.notes_path {
            settings.notes_path_override = Some(PathBuf::from(path));
        }
        if let Some(path) = &value.embeds_path {
            settings.embeds_path_override = Some(PathBuf::from(path));
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_defaults_from_empty_file_settings() {
        let resolved = KnowledgeSettings::from(&KnowledgeFileSettings::default());
        assert_eq!(resolved.retrieval.top_k, 2);
        assert_eq!(resolved.retrieval.max_context_chars, 4000);
        assert_eq!(resolved.refresh_interval(), Duration::from_secs(15 * 60));
        assert!(resolved.notes_path_override.is_none());
    }

    #[test]
    fn applies_overrides() {
        let file = KnowledgeFileSettings {
            embedding_model: Some("nomic-embed-text".to_string()),
            top_k: Some(5),
            refresh_minutes: Some(0),
            embeds_path: Some("/tmp/embeds.json".to_string()),
            ..Default::default()
        };
        let resolved = KnowledgeSettings::from(&file);
        assert_eq!(resolved.embedding_model, "nomic-embed-text");
        assert_eq!(resolved.retrieval.top_k, 5);
        // zero minutes is clamped so the interval timer never spins
        assert_eq!(resolved.refresh_interval(), Duration::from_secs(60));
        assert_eq!(
            resolved.embeds_path_override,
            Some(PathBuf::from("/tmp/embeds.json"))
        );
    }
}
