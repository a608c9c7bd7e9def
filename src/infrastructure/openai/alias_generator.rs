//! LLM-backed alias variant generation

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::chat::ChatClient;
use super::http_client::HttpClientTrait;
use crate::domain::alias::AliasGenerator;
use crate::domain::topic::TopicId;
use crate::domain::DomainError;

const ALIASES_PER_LANGUAGE: usize = 10;

const SYSTEM_PROMPT: &str = "You generate alias names for a campus information system. You \
understand Modern Standard Arabic, Levantine dialect, Arabizi (Arabic written in Latin \
letters), and English. Generate realistic phrasings students would actually type.";

/// Generator that asks the chat model for paraphrase variants
///
/// Requests ten Arabic and ten English variants spanning formal phrasing,
/// dialect, Arabizi, abbreviations, and common misspellings.
#[derive(Debug)]
pub struct OpenAiAliasGenerator<C: HttpClientTrait> {
    chat: Arc<ChatClient<C>>,
}

impl<C: HttpClientTrait> OpenAiAliasGenerator<C> {
    pub fn new(chat: Arc<ChatClient<C>>) -> Self {
        Self { chat }
    }

    fn build_prompt(topic_id: &TopicId, originating_query: &str) -> String {
        format!(
            r#"Topic key: {topic_id}
Original student question: "{originating_query}"

Generate exactly {n} Arabic aliases (formal Arabic, Levantine dialect, Arabizi, common
misspellings) and exactly {n} English aliases (formal, casual, abbreviations, common
misspellings) for this topic.

Rules:
- every alias must refer directly to the topic
- no duplicates
- realistic phrasings only

Return JSON exactly in this shape:
{{"arabic_aliases": ["..."], "english_aliases": ["..."]}}"#,
            n = ALIASES_PER_LANGUAGE,
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> AliasGenerator for OpenAiAliasGenerator<C> {
    async fn generate(
        &self,
        topic_id: &TopicId,
        originating_query: &str,
    ) -> Result<Vec<String>, DomainError> {
        let prompt = Self::build_prompt(topic_id, originating_query);

        let raw = self
            .chat
            .complete_json(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| DomainError::provider("openai", e.to_string()))?;

        let mut variants = Vec::with_capacity(ALIASES_PER_LANGUAGE * 2);

        for key in ["arabic_aliases", "english_aliases"] {
            if let Some(list) = raw.get(key).and_then(|v| v.as_array()) {
                variants.extend(
                    list.iter()
                        .filter_map(|v| v.as_str())
                        .take(ALIASES_PER_LANGUAGE)
                        .map(String::from),
                );
            }
        }

        debug!(topic = %topic_id, count = variants.len(), "alias variants generated");

        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openai::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn generator(client: MockHttpClient) -> OpenAiAliasGenerator<MockHttpClient> {
        let chat = ChatClient::new(client, "key", "gpt-4o")
            .with_retry(1, std::time::Duration::from_millis(1));
        OpenAiAliasGenerator::new(Arc::new(chat))
    }

    #[tokio::test]
    async fn test_generate_collects_both_languages() {
        let content = serde_json::json!({
            "arabic_aliases": ["تسجيل", "تسجيل المواد"],
            "english_aliases": ["registration", "how to register"],
        });
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"choices": [{"message": {"content": content.to_string()}}]}),
        );

        let variants = generator(client)
            .generate(&TopicId::new("course_registration"), "course registration")
            .await
            .unwrap();

        assert_eq!(variants.len(), 4);
        assert!(variants.contains(&"تسجيل".to_string()));
        assert!(variants.contains(&"registration".to_string()));
    }

    #[tokio::test]
    async fn test_generate_caps_per_language() {
        let many: Vec<String> = (0..25).map(|i| format!("alias {i}")).collect();
        let content = serde_json::json!({"arabic_aliases": [], "english_aliases": many});
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"choices": [{"message": {"content": content.to_string()}}]}),
        );

        let variants = generator(client)
            .generate(&TopicId::new("t"), "q")
            .await
            .unwrap();

        assert_eq!(variants.len(), ALIASES_PER_LANGUAGE);
    }

    #[tokio::test]
    async fn test_generate_error_propagates() {
        let client = MockHttpClient::new().with_error(TEST_URL, "overloaded");

        let result = generator(client).generate(&TopicId::new("t"), "q").await;

        assert!(result.is_err());
    }
}
