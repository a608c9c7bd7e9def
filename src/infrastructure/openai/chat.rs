//! Shared chat-completions client
//!
//! All OpenAI-backed collaborators (arbiter, extractor, alias generator,
//! synthesizer) go through this client: plain completions, JSON-mode
//! completions, and SSE-streamed completions, with linear-backoff retry on
//! the non-streaming calls.

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Stream of answer text chunks
pub type TextChunkStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// OpenAI chat-completions client
#[derive(Debug)]
pub struct ChatClient<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl<C: HttpClientTrait> ChatClient<C> {
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
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_body(&self, system: &str, user: &str, json_mode: bool, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "stream": stream,
        });

        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    async fn post_with_retry(&self, body: &serde_json::Value) -> Result<serde_json::Value, DomainError> {
        let url = self.completions_url();
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            match self.client.post_json(&url, self.headers(), body).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(attempt, error = %e, "chat completion attempt failed");
                    last_error = Some(e);

                    if attempt + 1 < self.max_retries {
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DomainError::provider("openai", "chat completion failed")))
    }

    fn extract_content(response: serde_json::Value) -> Result<String, DomainError> {
        let parsed: CompletionResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))
    }

    /// Run a completion and return the assistant text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let body = self.build_body(system, user, false, false);
        let response = self.post_with_retry(&body).await?;

        Self::extract_content(response)
    }

    /// Run a JSON-mode completion and parse the assistant text as JSON
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<serde_json::Value, DomainError> {
        let body = self.build_body(system, user, true, false);
        let response = self.post_with_retry(&body).await?;
        let content = Self::extract_content(response)?;

        parse_loose_json(&content)
            .ok_or_else(|| DomainError::provider("openai", "Response was not valid JSON"))
    }

    /// Run a streaming completion, yielding assistant text deltas
    pub async fn complete_stream(&self, system: &str, user: &str) -> Result<TextChunkStream, DomainError> {
        let body = self.build_body(system, user, false, true);
        let byte_stream = self
            .client
            .post_json_stream(&self.completions_url(), self.headers(), &body)
            .await?;

        let stream = byte_stream
            .scan(String::new(), |buffer, result| {
                let item = match result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        let deltas = drain_sse_deltas(buffer);
                        if deltas.is_empty() {
                            None
                        } else {
                            Some(Ok(deltas))
                        }
                    }
                    Err(e) => Some(Err(e)),
                };

                futures::future::ready(Some(item))
            })
            .filter_map(futures::future::ready);

        Ok(Box::pin(stream))
    }
}

/// Pull assistant deltas out of complete SSE lines, leaving any partial
/// trailing line in the buffer for the next chunk
fn drain_sse_deltas(buffer: &mut String) -> String {
    let mut deltas = String::new();

    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();

        let Some(data) = line.strip_prefix("data: ") else {
            continue;
        };

        if data == "[DONE]" {
            continue;
        }

        if let Ok(chunk) = serde_json::from_str::<StreamChunkResponse>(data) {
            if let Some(delta) = chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
                deltas.push_str(&delta);
            }
        }
    }

    deltas
}

/// Parse JSON that may arrive wrapped in markdown fences or prose
fn parse_loose_json(content: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(content) {
        return Some(value);
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    serde_json::from_str(&content[start..=end]).ok()
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunkResponse {
    choices: Vec<StreamChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChunkChoice {
    delta: StreamChunkDelta,
}

#[derive(Debug, Deserialize)]
struct StreamChunkDelta {
    content: Option<String>,
}
