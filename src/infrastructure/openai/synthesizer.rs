//! LLM-backed answer synthesis

use std::sync::Arc;

use async_trait::async_trait;

use super::chat::ChatClient;
use super::http_client::HttpClientTrait;
use crate::domain::synthesis::{AnswerSource, AnswerStream, AnswerSynthesizer};
use crate::domain::topic::TopicPayload;
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You are a campus assistant for university services. Produce \
detailed, friendly answers for students in the language of their question. When the question \
asks for a list, enumerate every item - never abbreviate with phrases like 'and more'. Use \
clear structure with headings and bullet points. Never mention caching, embeddings, or any \
other internal machinery.";

/// Synthesizer that turns a payload into a student-facing answer
#[derive(Debug)]
pub struct OpenAiSynthesizer<C: HttpClientTrait> {
    chat: Arc<ChatClient<C>>,
}

impl<C: HttpClientTrait> OpenAiSynthesizer<C> {
    pub fn new(chat: Arc<ChatClient<C>>) -> Self {
        Self { chat }
    }

    fn build_prompt(payload: &TopicPayload, query: &str, source: AnswerSource) -> String {
        let source_note = match source {
            AnswerSource::Cache => {
                "The data below was previously collected - expand and enrich it with your knowledge."
            }
            AnswerSource::Live => "The data below is freshly collected.",
        };

        let data = serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"{source_note}

Student question: "{query}"

Available data:
{data}

Use the data as the basis of your answer, explain each point, and add practical tips.
Suggest the official campus website for precise figures."#
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> AnswerSynthesizer for OpenAiSynthesizer<C> {
    async fn synthesize(
        &self,
        payload: &TopicPayload,
        query: &str,
        source: AnswerSource,
    ) -> Result<String, DomainError> {
        let prompt = Self::build_prompt(payload, query, source);

        self.chat.complete(SYSTEM_PROMPT, &prompt).await
    }

    async fn synthesize_stream(
        &self,
        payload: &TopicPayload,
        query: &str,
        source: AnswerSource,
    ) -> Result<AnswerStream, DomainError> {
        let prompt = Self::build_prompt(payload, query, source);

        self.chat.complete_stream(SYSTEM_PROMPT, &prompt).await
    }
}
