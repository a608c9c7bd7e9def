//! Answer synthesis collaborator trait

use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::domain::topic::TopicPayload;
use crate::domain::DomainError;

/// Where the payload behind an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Resolved from the semantic cache
    Cache,
    /// Freshly acquired from the extraction collaborator
    Live,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Live => "live",
        }
    }
}

/// Ordered, non-seekable sequence of answer text chunks
///
/// Terminated by stream end; an `Err` item ends delivery early.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// External collaborator that turns a payload into a student-facing answer
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync + Debug {
    /// Produce a whole answer
    async fn synthesize(
        &self,
        payload: &TopicPayload,
        query: &str,
        source: AnswerSource,
    ) -> Result<String, DomainError>;

    /// Produce the answer as a stream of text chunks
    async fn synthesize_stream(
        &self,
        payload: &TopicPayload,
        query: &str,
        source: AnswerSource,
    ) -> Result<AnswerStream, DomainError>;
}
