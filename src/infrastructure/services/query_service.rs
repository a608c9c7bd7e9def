//! Query orchestration service
//!
//! Request-scoped coordination: resolve the query against the semantic
//! cache, fall back to live acquisition on a miss, synthesize the answer,
//! and only then schedule background alias population. The response path is
//! never blocked on population, and a normal query never surfaces a hard
//! failure - every degradation path still produces an answer.

use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use tracing::{info, warn};

use crate::domain::alias::{normalize_alias, AliasEntry, AliasStore};
use crate::domain::extraction::{fallback_payload, ExtractionProvider, ResourceCatalog};
use crate::domain::resolution::{
    Resolution, ResolutionPolicy, ResolutionTier, CANDIDATE_THRESHOLD, CONFIDENT_THRESHOLD,
};
use crate::domain::synthesis::{render_fallback, AnswerSource, AnswerStream, AnswerSynthesizer};
use crate::domain::topic::{detect_language, CanonicalTopic, TopicId, TopicPayload, TopicStore};
use crate::domain::DomainError;
use crate::infrastructure::population::PopulationPipeline;

/// TTLs applied by the orchestrator
#[derive(Debug, Clone)]
pub struct QueryServiceConfig {
    pub topic_ttl: Duration,
    pub alias_ttl: Duration,
}

impl Default for QueryServiceConfig {
    fn default() -> Self {
        Self {
            topic_ttl: Duration::from_secs(86400),
            alias_ttl: Duration::from_secs(86400),
        }
    }
}

/// Resolution metadata shared by whole and streamed answers
#[derive(Debug, Clone)]
pub struct AnswerContext {
    pub source: AnswerSource,
    pub tier: ResolutionTier,
    pub topic_id: TopicId,
    pub matched_alias: Option<String>,
    pub similarity: f32,
    pub payload: TopicPayload,
}

/// A complete answer
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub context: AnswerContext,
    pub answer: String,
}

/// A streamed answer
pub struct StreamedAnswer {
    pub context: AnswerContext,
    pub stream: AnswerStream,
}

/// Store counts and threshold constants, served over `/stats`
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub topics: usize,
    pub aliases: usize,
    pub confident_threshold: f32,
    pub candidate_threshold: f32,
}

/// Per-query coordinator over the resolution engine and its collaborators
#[derive(Debug)]
pub struct QueryService {
    policy: ResolutionPolicy,
    topics: Arc<dyn TopicStore>,
    aliases: Arc<dyn AliasStore>,
    extractor: Arc<dyn ExtractionProvider>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    population: Arc<PopulationPipeline>,
    resources: ResourceCatalog,
    config: QueryServiceConfig,
}

impl QueryService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        policy: ResolutionPolicy,
        topics: Arc<dyn TopicStore>,
        aliases: Arc<dyn AliasStore>,
        extractor: Arc<dyn ExtractionProvider>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
        population: Arc<PopulationPipeline>,
        resources: ResourceCatalog,
        config: QueryServiceConfig,
    ) -> Self {
        Self {
            policy,
            topics,
            aliases,
            extractor,
            synthesizer,
            population,
            resources,
            config,
        }
    }

    /// Answer a query, blocking until the whole answer is ready
    pub async fn answer(&self, query: &str) -> Result<QueryAnswer, DomainError> {
        let context = self.prepare(query).await?;

        let answer = match self
            .synthesizer
            .synthesize(&context.payload, query, context.source)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "synthesis failed, rendering fallback answer");
                render_fallback(&context.payload)
            }
        };

        self.population.schedule(context.topic_id.clone(), query);

        Ok(QueryAnswer { context, answer })
    }

    /// Answer a query as a stream of text chunks
    pub async fn answer_stream(&self, query: &str) -> Result<StreamedAnswer, DomainError> {
        let context = self.prepare(query).await?;

        let stream: AnswerStream = match self
            .synthesizer
            .synthesize_stream(&context.payload, query, context.source)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "streaming synthesis failed, rendering fallback answer");
                Box::pin(stream::iter([Ok(render_fallback(&context.payload))]))
            }
        };

        self.population.schedule(context.topic_id.clone(), query);

        Ok(StreamedAnswer { context, stream })
    }

    /// Resolve the query and settle on a payload, acquiring fresh data on a
    /// miss. Returns before any synthesis happens.
    async fn prepare(&self, query: &str) -> Result<AnswerContext, DomainError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }

        let resolution = self.policy.resolve(query).await;

        if let Some(topic_id) = &resolution.topic_id {
            match self.topics.get(topic_id).await {
                Ok(Some(topic)) => {
                    info!(topic = %topic_id, "cache hit");
                    return Ok(AnswerContext {
                        source: AnswerSource::Cache,
                        tier: resolution.tier,
                        topic_id: topic_id.clone(),
                        matched_alias: resolution.matched_alias.clone(),
                        similarity: resolution.score,
                        payload: topic.into_payload(),
                    });
                }
                Ok(None) => {
                    info!(topic = %topic_id, "alias resolved but payload expired, re-acquiring");
                }
                Err(e) => {
                    warn!(topic = %topic_id, error = %e, "topic store unreachable, re-acquiring");
                }
            }
        }

        self.acquire(query, resolution).await
    }

    /// Miss path: acquire a fresh payload, persist it, and register the
    /// originating query as the topic's first alias
    async fn acquire(&self, query: &str, resolution: Resolution) -> Result<AnswerContext, DomainError> {
        let topic_id = resolution
            .topic_id
            .clone()
            .unwrap_or_else(|| TopicId::from_query(query));

        let hint = self.resources.select(topic_id.as_str(), query);

        let payload = match self.extractor.acquire(query, hint).await {
            Ok(payload) if !payload.is_empty() => payload,
            Ok(_) => {
                warn!(topic = %topic_id, "extraction returned an empty payload");
                fallback_payload(&topic_id, query)
            }
            Err(e) => {
                warn!(topic = %topic_id, error = %e, "extraction failed, using fallback payload");
                fallback_payload(&topic_id, query)
            }
        };

        let topic = CanonicalTopic::new(topic_id.clone(), payload.clone(), self.config.topic_ttl);

        match self.topics.put(topic).await {
            Ok(()) => self.register_originating_alias(query, &topic_id, &resolution).await,
            Err(e) => {
                warn!(topic = %topic_id, error = %e, "topic store unreachable, answer not cached");
            }
        }

        info!(
            topic = %topic_id,
            language = detect_language(query).as_str(),
            "live acquisition complete"
        );

        Ok(AnswerContext {
            source: AnswerSource::Live,
            tier: resolution.tier,
            topic_id,
            matched_alias: resolution.matched_alias,
            similarity: resolution.score,
            payload,
        })
    }

    /// Every new topic starts with at least one alias: the query that
    /// created it. Without a query embedding only the reverse index is
    /// updated; there is no vector to scan against.
    async fn register_originating_alias(
        &self,
        query: &str,
        topic_id: &TopicId,
        resolution: &Resolution,
    ) {
        if let Some(embedding) = &resolution.query_embedding {
            let entry = AliasEntry::new(
                query,
                topic_id.clone(),
                embedding.clone(),
                self.config.alias_ttl,
            );

            if let Err(e) = self.aliases.put(entry).await {
                warn!(topic = %topic_id, error = %e, "failed to store originating alias");
            }
        }

        if let Err(e) = self.topics.add_alias(topic_id, &normalize_alias(query)).await {
            warn!(topic = %topic_id, error = %e, "failed to index originating alias");
        }
    }

    /// Fetch a cached topic
    pub async fn topic(&self, id: &TopicId) -> Result<Option<CanonicalTopic>, DomainError> {
        self.topics.get(id).await
    }

    /// List the aliases registered for a topic
    pub async fn topic_aliases(&self, id: &TopicId) -> Result<Vec<String>, DomainError> {
        self.topics.aliases_for(id).await
    }

    /// Remove a topic, its reverse index, and its alias vectors
    pub async fn invalidate_topic(&self, id: &TopicId) -> Result<bool, DomainError> {
        for alias in self.topics.aliases_for(id).await? {
            if let Err(e) = self.aliases.delete(&alias).await {
                warn!(topic = %id, alias = %alias, error = %e, "failed to delete alias vector");
            }
        }

        self.topics.delete(id).await
    }

    /// Store counts and threshold constants
    pub async fn stats(&self) -> Result<CacheStats, DomainError> {
        Ok(CacheStats {
            topics: self.topics.len().await?,
            aliases: self.aliases.len().await?,
            confident_threshold: CONFIDENT_THRESHOLD,
            candidate_threshold: CANDIDATE_THRESHOLD,
        })
    }
}
