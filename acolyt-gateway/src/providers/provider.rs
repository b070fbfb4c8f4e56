//! Provider trait for abstracting the completion backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use acolyt_core::PromptMessage;

/// Token usage reported by the backend, when it reports any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// One completion result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ProviderUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("No content in response")]
    NoContent,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),
}

/// Completion backend.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current model
    fn model(&self) -> &str;

    /// Complete an ordered message list and return the reply text.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError>;
}

/// Reply text of a response, or `NoContent` when it is blank.
pub fn extract_text(response: ProviderResponse) -> Result<String, ProviderError> {
    if response.text.trim().is_empty() {
        Err(ProviderError::NoContent)
    } else {
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(text: &str) -> ProviderResponse {
        ProviderResponse {
            id: "chatcmpl-001".to_string(),
            model: "gpt-4".to_string(),
            text: text.to_string(),
            usage: Some(ProviderUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
            stop_reason: Some("stop".to_string()),
        }
    }

    #[test]
    fn test_extract_text() {
        assert_eq!(
            extract_text(response_with("Hello, world!")).unwrap(),
            "Hello, world!"
        );
    }

    #[test]
    fn test_extract_text_blank_is_no_content() {
        assert!(matches!(
            extract_text(response_with("  \n")),
            Err(ProviderError::NoContent)
        ));
    }
}
