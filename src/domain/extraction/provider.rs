//! Data extraction collaborator trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::topic::{TopicId, TopicPayload};
use crate::domain::DomainError;

/// External collaborator that produces a structured payload for a query
#[async_trait]
pub trait ExtractionProvider: Send + Sync + Debug {
    /// Acquire fresh structured facts for a query
    ///
    /// `resource_hint` is an optional helper URL handed through as context.
    async fn acquire(
        &self,
        query: &str,
        resource_hint: Option<&str>,
    ) -> Result<TopicPayload, DomainError>;
}

/// Minimal payload used when extraction produced nothing usable
///
/// Cached like any other payload; TTL expiry bounds how long it lingers and
/// a later successful extraction replaces it wholesale.
pub fn fallback_payload(topic_id: &TopicId, query: &str) -> TopicPayload {
    TopicPayload::new()
        .with_text("topic", topic_id.as_str())
        .with_text("query", query)
        .with_text(
            "message",
            "Unable to retrieve information at this time. Please check the official campus website or contact student services.",
        )
}
