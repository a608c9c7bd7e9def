//! Linear-scan similarity resolver

use std::sync::Arc;

use tracing::debug;

use super::result::ResolverMatch;
use crate::domain::alias::AliasStore;
use crate::domain::embedding::cosine_similarity;
use crate::domain::DomainError;

/// Scans the alias store for the entry closest to a query embedding
///
/// An O(N) scan: alias cardinality is bounded by topics x variants-per-topic,
/// not query volume. A production scale-up would put an approximate
/// nearest-neighbor index behind the same store contract.
#[derive(Debug)]
pub struct SimilarityResolver {
    aliases: Arc<dyn AliasStore>,
}

impl SimilarityResolver {
    pub fn new(aliases: Arc<dyn AliasStore>) -> Self {
        Self { aliases }
    }

    /// Find the best-matching alias for a query embedding
    ///
    /// Returns `None` when the store holds no aliases. On equal scores the
    /// oldest alias wins, which keeps results deterministic and favors
    /// established aliases.
    pub async fn best_match(
        &self,
        query_embedding: &[f32],
    ) -> Result<Option<ResolverMatch>, DomainError> {
        let entries = self.aliases.all().await?;

        let mut best: Option<(f32, u64, ResolverMatch)> = None;

        for entry in entries {
            let score = cosine_similarity(query_embedding, entry.embedding());

            let better = match &best {
                None => true,
                Some((best_score, best_created, _)) => {
                    score > *best_score || (score == *best_score && entry.created_at() < *best_created)
                }
            };

            if better {
                best = Some((
                    score,
                    entry.created_at(),
                    ResolverMatch {
                        alias: entry.text().to_string(),
                        topic_id: entry.topic_id().clone(),
                        score,
                    },
                ));
            }
        }

        match best {
            Some((score, _, matched)) => {
                debug!(
                    alias = %matched.alias,
                    topic = %matched.topic_id,
                    score,
                    "best alias match"
                );
                Ok(Some(matched))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alias::AliasEntry;
    use crate::domain::topic::TopicId;
    use crate::infrastructure::store::InMemoryAliasStore;
    use std::time::Duration;

    fn entry(text: &str, topic: &str, vector: Vec<f32>) -> AliasEntry {
        AliasEntry::new(text, TopicId::new(topic), vector, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_empty_store_no_match() {
        let store = Arc::new(InMemoryAliasStore::new());
        let resolver = SimilarityResolver::new(store);

        let result = resolver.best_match(&[1.0, 0.0]).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_highest_score_wins() {
        let store = Arc::new(InMemoryAliasStore::new());
        store.put(entry("far", "topic_far", vec![0.0, 1.0])).await.unwrap();
        store
            .put(entry("near", "topic_near", vec![0.9, 0.1]))
            .await
            .unwrap();

        let resolver = SimilarityResolver::new(store);
        let best = resolver.best_match(&[1.0, 0.0]).await.unwrap().unwrap();

        assert_eq!(best.alias, "near");
        assert_eq!(best.topic_id.as_str(), "topic_near");
        assert!(best.score > 0.9);
    }

    #[tokio::test]
    async fn test_tie_breaks_to_oldest() {
        let store = Arc::new(InMemoryAliasStore::new());

        let older = entry("older", "topic_a", vec![1.0, 0.0]).backdate(100);
        let newer = entry("newer", "topic_b", vec![1.0, 0.0]);

        // insertion order should not matter
        store.put(newer).await.unwrap();
        store.put(older).await.unwrap();

        let resolver = SimilarityResolver::new(store);
        let best = resolver.best_match(&[1.0, 0.0]).await.unwrap().unwrap();

        assert_eq!(best.alias, "older");
    }

    #[tokio::test]
    async fn test_zero_vector_query_scores_zero() {
        let store = Arc::new(InMemoryAliasStore::new());
        store.put(entry("any", "topic", vec![1.0, 0.0])).await.unwrap();

        let resolver = SimilarityResolver::new(store);
        let best = resolver.best_match(&[0.0, 0.0]).await.unwrap().unwrap();

        assert_eq!(best.score, 0.0);
    }
}
