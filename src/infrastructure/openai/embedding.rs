//! OpenAI embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Known OpenAI embedding models and their dimensions
const EMBEDDING_MODELS: &[(&str, usize)] = &[
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

const DEFAULT_DIMENSIONS: usize = 1536;

/// OpenAI embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    async fn request(&self, input: serde_json::Value) -> Result<Vec<Vec<f32>>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": input,
        });

        let response = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::embedding(e.to_string()))?;

        let parsed: EmbeddingsResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

fn normalize_input(text: &str) -> String {
    text.trim().to_lowercase()
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let normalized = normalize_input(text);

        if normalized.is_empty() {
            return Err(DomainError::embedding("empty input"));
        }

        self.request(serde_json::json!(normalized))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let normalized: Vec<String> = texts
            .iter()
            .map(|t| normalize_input(t))
            .filter(|t| !t.is_empty())
            .collect();

        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        self.request(serde_json::json!(normalized)).await
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_MODELS
            .iter()
            .find(|(name, _)| *name == self.model)
            .map(|(_, dims)| *dims)
            .unwrap_or(DEFAULT_DIMENSIONS)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
