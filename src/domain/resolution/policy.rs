//! Three-tier resolution policy
//!
//! Decides, for one free-text query, whether it refers to a known topic:
//! confident matches resolve directly, ambiguous ones are escalated to the
//! arbiter, and everything else (including any collaborator or store failure)
//! conservatively resolves to nothing. A resolution is terminal in one call
//! and never errors the query.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::arbiter::Arbiter;
use super::resolver::SimilarityResolver;
use super::result::{Resolution, ResolutionTier, ResolverMatch};
use crate::domain::alias::{AliasEntry, AliasStore};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::topic::{TopicId, TopicStore};

/// Configuration for the resolution policy
#[derive(Debug, Clone)]
pub struct ResolutionPolicyConfig {
    /// Time budget for one arbiter call
    pub arbiter_timeout: Duration,
    /// TTL applied to self-reinforcing alias writes
    pub alias_ttl: Duration,
}

impl Default for ResolutionPolicyConfig {
    fn default() -> Self {
        Self {
            arbiter_timeout: Duration::from_secs(10),
            alias_ttl: Duration::from_secs(86400),
        }
    }
}

/// Applies the three-tier decision to resolver output
#[derive(Debug)]
pub struct ResolutionPolicy {
    resolver: SimilarityResolver,
    embeddings: Arc<dyn EmbeddingProvider>,
    arbiter: Arc<dyn Arbiter>,
    aliases: Arc<dyn AliasStore>,
    topics: Arc<dyn TopicStore>,
    config: ResolutionPolicyConfig,
}

impl ResolutionPolicy {
    pub fn new(
        resolver: SimilarityResolver,
        embeddings: Arc<dyn EmbeddingProvider>,
        arbiter: Arc<dyn Arbiter>,
        aliases: Arc<dyn AliasStore>,
        topics: Arc<dyn TopicStore>,
        config: ResolutionPolicyConfig,
    ) -> Self {
        Self {
            resolver,
            embeddings,
            arbiter,
            aliases,
            topics,
            config,
        }
    }

    /// Resolve a query to a known topic, or to nothing
    pub async fn resolve(&self, query: &str) -> Resolution {
        let query_embedding = match self.embeddings.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "embedding failed, resolving to none");
                return Resolution::none();
            }
        };

        let matched = match self.resolver.best_match(&query_embedding).await {
            Ok(Some(matched)) => matched,
            Ok(None) => {
                debug!("no aliases stored yet");
                return Resolution {
                    query_embedding: Some(query_embedding),
                    ..Resolution::none()
                };
            }
            Err(e) => {
                warn!(error = %e, "alias scan failed, resolving to none");
                return Resolution {
                    query_embedding: Some(query_embedding),
                    ..Resolution::none()
                };
            }
        };

        let tier = ResolutionTier::from_score(matched.score);

        info!(
            alias = %matched.alias,
            topic = %matched.topic_id,
            score = matched.score,
            tier = tier.as_str(),
            "query scored against cache"
        );

        match tier {
            ResolutionTier::Confident => {
                self.reinforce(query, &query_embedding, &matched.topic_id).await;
                Resolution {
                    tier: ResolutionTier::Confident,
                    topic_id: Some(matched.topic_id.clone()),
                    matched_alias: Some(matched.alias),
                    score: matched.score,
                    query_embedding: Some(query_embedding),
                }
            }
            ResolutionTier::Ambiguous => self.arbitrate(query, query_embedding, matched).await,
            ResolutionTier::None => Resolution {
                tier: ResolutionTier::None,
                topic_id: None,
                matched_alias: Some(matched.alias),
                score: matched.score,
                query_embedding: Some(query_embedding),
            },
        }
    }

    /// Escalate an ambiguous match to the arbiter under a time budget
    async fn arbitrate(
        &self,
        query: &str,
        query_embedding: Vec<f32>,
        matched: ResolverMatch,
    ) -> Resolution {
        let summary = match self.topics.get(&matched.topic_id).await {
            Ok(Some(topic)) => topic.payload().summary(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "candidate payload unavailable for arbitration");
                String::new()
            }
        };

        let verdict = tokio::time::timeout(
            self.config.arbiter_timeout,
            self.arbiter.confirm(query, &matched.alias, &summary),
        )
        .await;

        let confirmed = match verdict {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(e)) => {
                warn!(error = %e, "arbiter failed, degrading to none");
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.arbiter_timeout.as_secs(),
                    "arbiter timed out, degrading to none"
                );
                false
            }
        };

        if confirmed {
            info!(topic = %matched.topic_id, "arbiter confirmed ambiguous match");
            self.reinforce(query, &query_embedding, &matched.topic_id).await;
            Resolution {
                tier: ResolutionTier::Confident,
                topic_id: Some(matched.topic_id.clone()),
                matched_alias: Some(matched.alias),
                score: matched.score,
                query_embedding: Some(query_embedding),
            }
        } else {
            Resolution {
                tier: ResolutionTier::None,
                topic_id: None,
                matched_alias: Some(matched.alias),
                score: matched.score,
                query_embedding: Some(query_embedding),
            }
        }
    }

    /// Store the query text itself as an alias of the resolved topic, so the
    /// next identical query hits in a single resolver pass. Failures are
    /// logged and swallowed; reinforcement is an optimization, not a
    /// correctness requirement.
    async fn reinforce(&self, query: &str, embedding: &[f32], topic_id: &TopicId) {
        let entry = AliasEntry::new(
            query,
            topic_id.clone(),
            embedding.to_vec(),
            self.config.alias_ttl,
        );
        let alias_text = entry.text().to_string();

        if let Err(e) = self.aliases.put(entry).await {
            warn!(error = %e, "failed to store reinforcing alias");
            return;
        }

        if let Err(e) = self.topics.add_alias(topic_id, &alias_text).await {
            warn!(error = %e, "failed to register reinforcing alias");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::resolution::MockArbiter;
    use crate::domain::topic::{CanonicalTopic, TopicPayload};
    use crate::infrastructure::store::{InMemoryAliasStore, InMemoryTopicStore};

    struct Fixture {
        aliases: Arc<InMemoryAliasStore>,
        topics: Arc<InMemoryTopicStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                aliases: Arc::new(InMemoryAliasStore::new()),
                topics: Arc::new(InMemoryTopicStore::new()),
            }
        }

        async fn seed_alias(&self, text: &str, topic: &str, vector: Vec<f32>) {
            self.aliases
                .put(AliasEntry::new(
                    text,
                    TopicId::new(topic),
                    vector,
                    Duration::from_secs(3600),
                ))
                .await
                .unwrap();
        }

        async fn seed_topic(&self, id: &str, title: &str) {
            self.topics
                .put(CanonicalTopic::new(
                    TopicId::new(id),
                    TopicPayload::new().with_text("title", title),
                    Duration::from_secs(3600),
                ))
                .await
                .unwrap();
        }

        fn policy(
            &self,
            embeddings: Arc<dyn EmbeddingProvider>,
            arbiter: Arc<dyn Arbiter>,
        ) -> ResolutionPolicy {
            ResolutionPolicy::new(
                SimilarityResolver::new(self.aliases.clone()),
                embeddings,
                arbiter,
                self.aliases.clone(),
                self.topics.clone(),
                ResolutionPolicyConfig {
                    arbiter_timeout: Duration::from_millis(100),
                    alias_ttl: Duration::from_secs(3600),
                },
            )
        }
    }

    #[tokio::test]
    async fn test_confident_match_resolves_and_reinforces() {
        let fixture = Fixture::new();
        fixture
            .seed_alias("course registration", "course_registration", vec![1.0, 0.0])
            .await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("how to register", vec![0.95, 0.31]));
        let arbiter = Arc::new(MockArbiter::rejecting());
        let policy = fixture.policy(embeddings, arbiter.clone());

        let resolution = policy.resolve("how to register").await;

        assert_eq!(resolution.tier, ResolutionTier::Confident);
        assert_eq!(
            resolution.topic_id.as_ref().unwrap().as_str(),
            "course_registration"
        );
        // confident matches never consult the arbiter
        assert_eq!(arbiter.calls(), 0);

        // the query itself became a retrievable alias of the topic
        let stored = fixture.aliases.get("how to register").await.unwrap().unwrap();
        assert_eq!(stored.topic_id().as_str(), "course_registration");
    }

    #[tokio::test]
    async fn test_repeat_query_hits_confident_in_one_pass() {
        let fixture = Fixture::new();
        fixture
            .seed_alias("course registration", "course_registration", vec![1.0, 0.0])
            .await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("how to register", vec![0.95, 0.31]));
        let policy = fixture.policy(embeddings, Arc::new(MockArbiter::rejecting()));

        policy.resolve("how to register").await;
        let repeat = policy.resolve("how to register").await;

        assert_eq!(repeat.tier, ResolutionTier::Confident);
        // the reinforced alias matches the identical query exactly
        assert!((repeat.score - 1.0).abs() < 0.001);
        assert_eq!(repeat.matched_alias.as_deref(), Some("how to register"));
    }

    #[tokio::test]
    async fn test_ambiguous_confirmed_by_arbiter() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;
        fixture.seed_topic("tuition_fees", "Tuition Fees").await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("payment stuff", vec![0.58, 0.8146]));
        let arbiter = Arc::new(MockArbiter::confirming());
        let policy = fixture.policy(embeddings, arbiter.clone());

        let resolution = policy.resolve("payment stuff").await;

        assert_eq!(arbiter.calls(), 1);
        assert_eq!(resolution.tier, ResolutionTier::Confident);
        assert_eq!(resolution.topic_id.as_ref().unwrap().as_str(), "tuition_fees");
    }

    #[tokio::test]
    async fn test_ambiguous_rejected_by_arbiter() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("dorm rooms", vec![0.58, 0.8146]));
        let arbiter = Arc::new(MockArbiter::rejecting());
        let policy = fixture.policy(embeddings, arbiter.clone());

        let resolution = policy.resolve("dorm rooms").await;

        assert_eq!(arbiter.calls(), 1);
        assert_eq!(resolution.tier, ResolutionTier::None);
        assert!(resolution.topic_id.is_none());
        // the near-miss is still reported for observability
        assert_eq!(resolution.matched_alias.as_deref(), Some("fees"));
    }

    #[tokio::test]
    async fn test_arbiter_failure_degrades_to_none() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("q", vec![0.58, 0.8146]));
        let arbiter = Arc::new(MockArbiter::confirming().with_error("model overloaded"));
        let policy = fixture.policy(embeddings, arbiter);

        let resolution = policy.resolve("q").await;

        assert_eq!(resolution.tier, ResolutionTier::None);
    }

    #[tokio::test]
    async fn test_arbiter_timeout_degrades_to_none() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("q", vec![0.58, 0.8146]));
        let arbiter = Arc::new(MockArbiter::confirming().with_delay(Duration::from_secs(5)));
        let policy = fixture.policy(embeddings, arbiter);

        let resolution = policy.resolve("q").await;

        assert_eq!(resolution.tier, ResolutionTier::None);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_none() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;

        let embeddings = Arc::new(MockEmbeddingProvider::new(2).with_error("unavailable"));
        let policy = fixture.policy(embeddings, Arc::new(MockArbiter::confirming()));

        let resolution = policy.resolve("anything").await;

        assert_eq!(resolution.tier, ResolutionTier::None);
        assert!(resolution.query_embedding.is_none());
    }

    #[tokio::test]
    async fn test_low_score_resolves_to_none_without_arbiter() {
        let fixture = Fixture::new();
        fixture.seed_alias("fees", "tuition_fees", vec![1.0, 0.0]).await;

        let embeddings =
            Arc::new(MockEmbeddingProvider::new(2).with_vector("library hours", vec![0.2, 0.98]));
        let arbiter = Arc::new(MockArbiter::confirming());
        let policy = fixture.policy(embeddings, arbiter.clone());

        let resolution = policy.resolve("library hours").await;

        assert_eq!(resolution.tier, ResolutionTier::None);
        assert_eq!(arbiter.calls(), 0);
    }
}
