//! OpenAI-compatible API client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use acolyt_core::{CompletionSettings, PromptMessage};

use crate::providers::provider::{
    Provider, ProviderError, ProviderResponse, ProviderUsage, extract_text,
};

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    provider_name: String,
    max_tokens: u32,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiCompatibleClient {
    /// Create a new OpenAI-compatible client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        provider_name: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, api_key, model, provider_name, DEFAULT_TIMEOUT)
    }

    /// Create a client whose HTTP requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        provider_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            provider_name: provider_name.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Build a client from the `[completion]` settings section.
    pub fn from_settings(
        settings: &CompletionSettings,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        Ok(Self::with_timeout(
            &settings.base_url,
            Some(api_key),
            &settings.model,
            "openai",
            Duration::from_secs(settings.timeout_seconds.max(1)),
        )?
        .with_max_tokens(settings.max_tokens))
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            let auth_value = format!("Bearer {}", api_key);
            if let Ok(header_value) = HeaderValue::from_str(&auth_value) {
                headers.insert(AUTHORIZATION, header_value);
            }
        }
        headers
    }

    fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    fn chat_completions_url(&self) -> String {
        let base = self.normalized_base_url();
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn build_request<'a>(&'a self, messages: &'a [PromptMessage]) -> ChatCompletionsRequest<'a> {
        ChatCompletionsRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.max_tokens,
        }
    }

    fn convert_response(response: ChatCompletionsResponse) -> ProviderResponse {
        let choice = response.choices.into_iter().next();
        let stop_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let text = choice
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        ProviderResponse {
            id: response.id,
            model: response.model,
            text,
            usage: response.usage.map(|u| ProviderUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
            stop_reason,
        }
    }

    /// Send the messages and return the full provider response.
    pub async fn send_messages(
        &self,
        messages: &[PromptMessage],
    ) -> Result<ProviderResponse, ProviderError> {
        let url = self.chat_completions_url();
        let request_body = self.build_request(messages);

        let response = self
            .http_client
            .post(&url)
            .headers(self.build_headers())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        let completions_response: ChatCompletionsResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                let preview = if response_text.len() > 500 {
                    &response_text[..response_text.floor_char_boundary(500)]
                } else {
                    &response_text
                };
                ProviderError::InvalidFormat(format!(
                    "Failed to parse OpenAI-compatible response: {e}\nBody preview: {preview}"
                ))
            })?;

        let response = Self::convert_response(completions_response);
        if let Some(usage) = &response.usage {
            debug!(
                provider = %self.provider_name,
                model = %response.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion usage"
            );
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        extract_text(self.send_messages(messages).await?)
    }
}
