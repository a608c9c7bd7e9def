//! Query endpoint request/response types

use serde::{Deserialize, Serialize};

use crate::domain::resolution::ResolutionTier;
use crate::domain::synthesis::AnswerSource;
use crate::domain::topic::TopicPayload;
use crate::infrastructure::services::QueryAnswer;

/// POST /query request body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The student's question
    pub query: String,
    /// Stream the answer over SSE instead of returning it whole
    #[serde(default)]
    pub stream: bool,
}

/// POST /query response body
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub source: AnswerSource,
    pub tier: ResolutionTier,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
    pub similarity: f32,
    pub payload: TopicPayload,
    pub aliases: Vec<String>,
    pub answer: String,
}

impl QueryResponse {
    pub fn from_answer(answer: QueryAnswer, aliases: Vec<String>) -> Self {
        Self {
            source: answer.context.source,
            tier: answer.context.tier,
            topic: answer.context.topic_id.to_string(),
            matched_alias: answer.context.matched_alias,
            similarity: answer.context.similarity,
            payload: answer.context.payload,
            aliases,
            answer: answer.answer,
        }
    }
}

/// First SSE event of a streamed answer
#[derive(Debug, Clone, Serialize)]
pub struct StreamMeta {
    pub source: AnswerSource,
    pub tier: ResolutionTier,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
    pub similarity: f32,
}

/// Content SSE event of a streamed answer
#[derive(Debug, Clone, Serialize)]
pub struct StreamDelta {
    pub delta: String,
}
