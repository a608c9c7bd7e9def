//! LLM-backed data extraction

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::chat::ChatClient;
use super::http_client::HttpClientTrait;
use crate::domain::extraction::ExtractionProvider;
use crate::domain::topic::TopicPayload;
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You are an assistant for a campus information system covering \
university services in Arabic and English. Generate helpful, factual information for student \
questions. For precise figures (fees, dates) point students to the official campus website. \
Return valid JSON only.";

/// Extractor that asks the chat model for a structured dataset
#[derive(Debug)]
pub struct OpenAiExtractor<C: HttpClientTrait> {
    chat: Arc<ChatClient<C>>,
}

impl<C: HttpClientTrait> OpenAiExtractor<C> {
    pub fn new(chat: Arc<ChatClient<C>>) -> Self {
        Self { chat }
    }

    fn build_prompt(query: &str, resource_hint: Option<&str>) -> String {
        let hint_line = match resource_hint {
            Some(url) => format!("Reference URL for context: {url}\n"),
            None => String::new(),
        };

        format!(
            r#"Build a structured dataset answering this student question.

Question: "{query}"
{hint_line}
Return a JSON object using only fields that have actual content:
{{
    "title": "topic title",
    "summary": "helpful summary (300-500 characters)",
    "requirements": ["..."],
    "steps": ["..."],
    "deadlines": ["..."],
    "key_points": ["..."],
    "tips": ["..."],
    "fees": {{"item": "amount"}},
    "contact_info": {{"office": "detail"}},
    "website": "official URL for more information"
}}

Answer in the language of the question. Do not invent precise figures."#
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> ExtractionProvider for OpenAiExtractor<C> {
    async fn acquire(
        &self,
        query: &str,
        resource_hint: Option<&str>,
    ) -> Result<TopicPayload, DomainError> {
        debug!(query, resource_hint, "acquiring fresh data");

        let prompt = Self::build_prompt(query, resource_hint);

        let raw = self
            .chat
            .complete_json(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| DomainError::extraction(e.to_string()))?;

        let mut payload = TopicPayload::from_json(&raw);

        if payload.is_empty() {
            return Err(DomainError::extraction("extraction produced no usable fields"));
        }

        if let Some(url) = resource_hint {
            payload = payload.with_text("url", url);
        }

        info!(query, fields = payload.len(), "extraction complete");

        Ok(payload)
    }
}
