//! In-memory store implementations
//!
//! Suitable for development and tests. For production deployments use the
//! Redis-backed stores behind the same traits.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::alias::{normalize_alias, AliasEntry, AliasStore};
use crate::domain::topic::{CanonicalTopic, TopicId, TopicStore};
use crate::domain::DomainError;

/// In-memory alias store keyed by normalized alias text
#[derive(Debug, Default)]
pub struct InMemoryAliasStore {
    entries: RwLock<HashMap<String, AliasEntry>>,
}

impl InMemoryAliasStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AliasStore for InMemoryAliasStore {
    async fn put(&self, entry: AliasEntry) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        entries.insert(entry.text().to_string(), entry);

        Ok(())
    }

    async fn get(&self, alias: &str) -> Result<Option<AliasEntry>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        let entry = entries.get(&normalize_alias(alias)).cloned();

        Ok(entry.filter(|e| !e.is_expired()))
    }

    async fn all(&self) -> Result<Vec<AliasEntry>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(entries
            .values()
            .filter(|e| !e.is_expired())
            .cloned()
            .collect())
    }

    async fn delete(&self, alias: &str) -> Result<bool, DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        Ok(entries.remove(&normalize_alias(alias)).is_some())
    }

    async fn expire(&self) -> Result<usize, DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(text, _)| text.clone())
            .collect();

        let count = expired.len();

        for text in expired {
            entries.remove(&text);
        }

        Ok(count)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(entries.values().filter(|e| !e.is_expired()).count())
    }
}

/// In-memory canonical topic store with its alias reverse index
#[derive(Debug, Default)]
pub struct InMemoryTopicStore {
    topics: RwLock<HashMap<TopicId, CanonicalTopic>>,
    reverse_index: RwLock<HashMap<TopicId, Vec<String>>>,
}

impl InMemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopicStore for InMemoryTopicStore {
    async fn get(&self, id: &TopicId) -> Result<Option<CanonicalTopic>, DomainError> {
        let topics = self
            .topics
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(topics.get(id).cloned().filter(|t| !t.is_expired()))
    }

    async fn put(&self, topic: CanonicalTopic) -> Result<(), DomainError> {
        let mut topics = self
            .topics
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        topics.insert(topic.id().clone(), topic);

        Ok(())
    }

    async fn aliases_for(&self, id: &TopicId) -> Result<Vec<String>, DomainError> {
        let index = self
            .reverse_index
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(index.get(id).cloned().unwrap_or_default())
    }

    async fn add_alias(&self, id: &TopicId, alias: &str) -> Result<(), DomainError> {
        let mut index = self
            .reverse_index
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        let normalized = normalize_alias(alias);
        let aliases = index.entry(id.clone()).or_default();

        if !aliases.contains(&normalized) {
            aliases.push(normalized);
        }

        Ok(())
    }

    async fn delete(&self, id: &TopicId) -> Result<bool, DomainError> {
        let mut topics = self
            .topics
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;
        let mut index = self
            .reverse_index
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        index.remove(id);

        Ok(topics.remove(id).is_some())
    }

    async fn expire(&self) -> Result<usize, DomainError> {
        let mut topics = self
            .topics
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;
        let mut index = self
            .reverse_index
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        let expired: Vec<TopicId> = topics
            .iter()
            .filter(|(_, t)| t.is_expired())
            .map(|(id, _)| id.clone())
            .collect();

        let count = expired.len();

        for id in expired {
            topics.remove(&id);
            index.remove(&id);
        }

        Ok(count)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let topics = self
            .topics
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(topics.values().filter(|t| !t.is_expired()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topic::TopicPayload;
    use std::time::Duration;

    fn alias(text: &str, topic: &str, vector: Vec<f32>) -> AliasEntry {
        AliasEntry::new(text, TopicId::new(topic), vector, Duration::from_secs(3600))
    }

    fn expired_alias(text: &str, topic: &str) -> AliasEntry {
        AliasEntry::new(text, TopicId::new(topic), vec![1.0], Duration::from_secs(0))
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryAliasStore::new();
        store.put(alias("fees", "tuition_fees", vec![1.0])).await.unwrap();

        let entry = store.get("fees").await.unwrap().unwrap();
        assert_eq!(entry.topic_id().as_str(), "tuition_fees");
    }

    #[tokio::test]
    async fn test_get_normalizes_lookup() {
        let store = InMemoryAliasStore::new();
        store.put(alias("Fees", "tuition_fees", vec![1.0])).await.unwrap();

        assert!(store.get("  FEES ").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_text() {
        let store = InMemoryAliasStore::new();

        store.put(alias("fees", "old_topic", vec![1.0, 0.0])).await.unwrap();
        store.put(alias("fees", "tuition_fees", vec![0.0, 1.0])).await.unwrap();

        let entry = store.get("fees").await.unwrap().unwrap();
        assert_eq!(entry.topic_id().as_str(), "tuition_fees");
        assert_eq!(entry.embedding(), &[0.0, 1.0]);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_invisible() {
        let store = InMemoryAliasStore::new();
        store.put(expired_alias("old", "topic")).await.unwrap();
        store.put(alias("fresh", "topic", vec![1.0])).await.unwrap();

        assert!(store.get("old").await.unwrap().is_none());
        assert_eq!(store.all().await.unwrap().len(), 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_sweep() {
        let store = InMemoryAliasStore::new();
        store.put(expired_alias("old", "topic")).await.unwrap();
        store.put(alias("fresh", "topic", vec![1.0])).await.unwrap();

        let swept = store.expire().await.unwrap();
        assert_eq!(swept, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryAliasStore::new();
        store.put(alias("fees", "tuition_fees", vec![1.0])).await.unwrap();

        assert!(store.delete("fees").await.unwrap());
        assert!(!store.delete("fees").await.unwrap());
        assert!(store.get("fees").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_topic_put_get_replace() {
        let store = InMemoryTopicStore::new();
        let id = TopicId::new("tuition_fees");

        store
            .put(CanonicalTopic::new(
                id.clone(),
                TopicPayload::new().with_text("title", "Old"),
                Duration::from_secs(3600),
            ))
            .await
            .unwrap();
        store
            .put(CanonicalTopic::new(
                id.clone(),
                TopicPayload::new().with_text("title", "New"),
                Duration::from_secs(3600),
            ))
            .await
            .unwrap();

        // full replace on re-extraction
        let topic = store.get(&id).await.unwrap().unwrap();
        assert_eq!(topic.payload().text("title"), Some("New"));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reverse_index_dedups() {
        let store = InMemoryTopicStore::new();
        let id = TopicId::new("tuition_fees");

        store.add_alias(&id, "fees").await.unwrap();
        store.add_alias(&id, "FEES").await.unwrap();
        store.add_alias(&id, "رسوم").await.unwrap();

        let aliases = store.aliases_for(&id).await.unwrap();
        assert_eq!(aliases, vec!["fees", "رسوم"]);
    }

    #[tokio::test]
    async fn test_topic_delete_clears_index() {
        let store = InMemoryTopicStore::new();
        let id = TopicId::new("tuition_fees");

        store
            .put(CanonicalTopic::new(
                id.clone(),
                TopicPayload::new(),
                Duration::from_secs(3600),
            ))
            .await
            .unwrap();
        store.add_alias(&id, "fees").await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.aliases_for(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_topic_invisible() {
        let store = InMemoryTopicStore::new();
        let id = TopicId::new("t");

        store
            .put(CanonicalTopic::new(
                id.clone(),
                TopicPayload::new(),
                Duration::from_secs(0),
            ))
            .await
            .unwrap();

        assert!(store.get(&id).await.unwrap().is_none());
        assert_eq!(store.expire().await.unwrap(), 1);
    }
}
