use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>>;
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(settings: &KnowledgeSettings, api_key: Option<String>) -> Self {
        let timeout = settings.embedding_timeout();
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to build embedding HTTP client, using defaults without timeout"
                );
                reqwest::Client::new()
            }
        };
        Self {
            base_url: settings.embedding_url.trim_end_matches('/').to_string(),
            model: settings.embedding_model.clone(),
            api_key,
            timeout,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn embeddings_url(&self) -> String {
        if self.base_url.ends_with("/v1") {
            format!("{}/embeddings", self.base_url)
        } else {
            format!("{}/v1/embeddings", self.base_url)
        }
    }

    /// Embed several inputs in one request. Output order matches input order.
    pub async fn embed_batch(&self, inputs: &[String]) -> KnowledgeResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbedRequest {
            model: &self.model,
            input: inputs,
        };
        let mut request = self.client.post(self.embeddings_url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| KnowledgeError::EmbeddingTimeout(self.timeout))??;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Embedding(format!(
                "embedding request failed: {status} {text}"
            )));
        }

        let payload: EmbedResponse = response.json().await?;
        collect_vectors(payload, inputs.len())
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| KnowledgeError::Embedding("embedding response missing vectors".into()))
    }
}

fn collect_vectors(payload: EmbedResponse, expected: usize) -> KnowledgeResult<Vec<Vec<f32>>> {
    let mut data = payload.data;
    if data.len() != expected {
        return Err(KnowledgeError::Embedding(format!(
            "embedding response has {} vectors for {expected} inputs",
            data.len()
        )));
    }
    data.sort_by_key(|item| item.index);
    Ok(data.into_iter().map(|item| item.embedding).collect())
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> EmbeddingClient {
        let settings = KnowledgeSettings {
            embedding_url: url.to_string(),
            ..Default::default()
        };
        EmbeddingClient::new(&settings, None)
    }

    #[test]
    fn test_embeddings_url_with_v1_suffix() {
        let client = client_for("https://api.openai.com/v1/");
        assert_eq!(client.embeddings_url(), "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn test_embeddings_url_without_v1_suffix() {
        let client = client_for("http://localhost:11434");
        assert_eq!(client.embeddings_url(), "http://localhost:11434/v1/embeddings");
    }

    #[test]
    fn vectors_are_reordered_by_index() {
        let payload: EmbedResponse = serde_json::from_str(
            r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#,
        )
        .unwrap();
        let vectors = collect_vectors(payload, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn short_response_is_an_error() {
        let payload: EmbedResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0],"index":0}]}"#).unwrap();
        assert!(matches!(
            collect_vectors(payload, 2),
            Err(KnowledgeError::Embedding(_))
        ));
    }
}
