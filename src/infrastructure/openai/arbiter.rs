//! LLM-backed arbiter for ambiguous matches

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::chat::ChatClient;
use super::http_client::HttpClientTrait;
use crate::domain::resolution::Arbiter;
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You are a semantic matching expert for a campus information system. \
Analyze student queries and decide whether they refer to the same topic as a candidate alias. \
Be strict - only match if the semantic meaning aligns. Respond in JSON.";

/// Arbiter that asks the chat model whether an ambiguous match holds
#[derive(Debug)]
pub struct OpenAiArbiter<C: HttpClientTrait> {
    chat: Arc<ChatClient<C>>,
}

impl<C: HttpClientTrait> OpenAiArbiter<C> {
    pub fn new(chat: Arc<ChatClient<C>>) -> Self {
        Self { chat }
    }

    fn build_prompt(query: &str, candidate_alias: &str, candidate_summary: &str) -> String {
        format!(
            r#"User query: "{query}"

Candidate alias: "{candidate_alias}"
Candidate topic summary: "{candidate_summary}"

Does the query ask about the same topic as the candidate alias?

Respond in JSON:
{{"match": true or false, "reasoning": "brief explanation"}}"#
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> Arbiter for OpenAiArbiter<C> {
    async fn confirm(
        &self,
        query: &str,
        candidate_alias: &str,
        candidate_summary: &str,
    ) -> Result<bool, DomainError> {
        let prompt = Self::build_prompt(query, candidate_alias, candidate_summary);

        let verdict = self
            .chat
            .complete_json(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| DomainError::arbiter(e.to_string()))?;

        let confirmed = verdict
            .get("match")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| DomainError::arbiter("verdict missing 'match' field"))?;

        debug!(query, candidate_alias, confirmed, "arbiter verdict");

        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openai::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn verdict_response(matched: bool) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": {
                    "content": format!(r#"{{"match": {}, "reasoning": "test"}}"#, matched)
                }
            }]
        })
    }

    fn arbiter(client: MockHttpClient) -> OpenAiArbiter<MockHttpClient> {
        let chat = ChatClient::new(client, "key", "gpt-4o")
            .with_retry(1, std::time::Duration::from_millis(1));
        OpenAiArbiter::new(Arc::new(chat))
    }

    #[tokio::test]
    async fn test_confirms_match() {
        let client = MockHttpClient::new().with_response(TEST_URL, verdict_response(true));

        let confirmed = arbiter(client)
            .confirm("payment options", "tuition fees", "Tuition Fees - fee schedule")
            .await
            .unwrap();

        assert!(confirmed);
    }

    #[tokio::test]
    async fn test_rejects_match() {
        let client = MockHttpClient::new().with_response(TEST_URL, verdict_response(false));

        let confirmed = arbiter(client)
            .confirm("dorm rooms", "tuition fees", "Tuition Fees")
            .await
            .unwrap();

        assert!(!confirmed);
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_arbiter() {
        let client = MockHttpClient::new().with_error(TEST_URL, "overloaded");

        let result = arbiter(client).confirm("q", "alias", "summary").await;

        assert!(matches!(result, Err(DomainError::Arbiter { .. })));
    }

    #[tokio::test]
    async fn test_malformed_verdict_is_error() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({
                "choices": [{"message": {"content": r#"{"confidence": 0.4}"#}}]
            }),
        );

        let result = arbiter(client).confirm("q", "alias", "summary").await;

        assert!(matches!(result, Err(DomainError::Arbiter { .. })));
    }
}
