//! Canonical data store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{CanonicalTopic, TopicId};
use crate::domain::DomainError;

/// Persistent mapping from canonical topic id to its payload and alias set
///
/// Single-key operations are atomic; the store provides its own
/// synchronization. Implementations fail with `DomainError::Store` when the
/// persistence layer is unreachable, and callers degrade rather than crash.
#[async_trait]
pub trait TopicStore: Send + Sync + Debug {
    /// Fetch a topic; expired topics read as absent
    async fn get(&self, id: &TopicId) -> Result<Option<CanonicalTopic>, DomainError>;

    /// Upsert a topic, replacing any prior payload wholesale
    async fn put(&self, topic: CanonicalTopic) -> Result<(), DomainError>;

    /// All alias texts registered for a topic (the reverse index)
    async fn aliases_for(&self, id: &TopicId) -> Result<Vec<String>, DomainError>;

    /// Append an alias text to the topic's reverse index, skipping duplicates
    async fn add_alias(&self, id: &TopicId, alias: &str) -> Result<(), DomainError>;

    /// Remove a topic and its reverse index
    async fn delete(&self, id: &TopicId) -> Result<bool, DomainError>;

    /// Sweep expired topics, returning how many were removed
    async fn expire(&self) -> Result<usize, DomainError>;

    /// Number of live topics
    async fn len(&self) -> Result<usize, DomainError>;
}
