//! Alias-variant generator trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::topic::TopicId;
use crate::domain::DomainError;

/// External collaborator that proposes paraphrase variants for a topic
///
/// Variants span registers, dialects, and both languages; the sequence is
/// finite and not restartable. On-topic plausibility is the generator's
/// contract; the population pipeline only deduplicates and drops empties.
#[async_trait]
pub trait AliasGenerator: Send + Sync + Debug {
    async fn generate(
        &self,
        topic_id: &TopicId,
        originating_query: &str,
    ) -> Result<Vec<String>, DomainError>;
}
