//! Background alias population
//!
//! Generates paraphrase variants for a topic, embeds them, and folds them
//! into the stores. Runs fire-and-forget: the triggering request holds no
//! handle and failures never reach the request path. Partial population is
//! harmless; a failed run releases its claim and the next resolution of the
//! same topic re-triggers it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::in_flight::InFlightPopulations;
use crate::domain::alias::{normalize_alias, AliasEntry, AliasGenerator, AliasStore};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::topic::{TopicId, TopicStore};
use crate::domain::DomainError;

/// Asynchronous alias population pipeline
#[derive(Debug)]
pub struct PopulationPipeline {
    aliases: Arc<dyn AliasStore>,
    topics: Arc<dyn TopicStore>,
    generator: Arc<dyn AliasGenerator>,
    embeddings: Arc<dyn EmbeddingProvider>,
    in_flight: InFlightPopulations,
    alias_ttl: Duration,
}

impl PopulationPipeline {
    pub fn new(
        aliases: Arc<dyn AliasStore>,
        topics: Arc<dyn TopicStore>,
        generator: Arc<dyn AliasGenerator>,
        embeddings: Arc<dyn EmbeddingProvider>,
        in_flight: InFlightPopulations,
        alias_ttl: Duration,
    ) -> Self {
        Self {
            aliases,
            topics,
            generator,
            embeddings,
            in_flight,
            alias_ttl,
        }
    }

    /// Schedule population on a detached task
    pub fn schedule(self: &Arc<Self>, topic_id: TopicId, originating_query: &str) {
        let pipeline = Arc::clone(self);
        let query = originating_query.to_string();

        tokio::spawn(async move {
            if let Err(e) = pipeline.populate(topic_id.clone(), &query).await {
                warn!(topic = %topic_id, error = %e, "population failed");
            }
        });
    }

    /// Run one population pass for a topic
    ///
    /// A no-op when another run already holds the topic's in-flight claim.
    pub async fn populate(&self, topic_id: TopicId, originating_query: &str) -> Result<(), DomainError> {
        let Some(_guard) = self.in_flight.try_begin(topic_id.clone()) else {
            debug!(topic = %topic_id, "population already in flight, skipping");
            return Ok(());
        };

        let variants = self
            .generator
            .generate(&topic_id, originating_query)
            .await
            .map_err(|e| DomainError::population(format!("variant generation: {}", e)))?;

        let existing: HashSet<String> = self
            .topics
            .aliases_for(&topic_id)
            .await
            .unwrap_or_else(|e| {
                warn!(topic = %topic_id, error = %e, "reverse index unavailable, deduplicating within batch only");
                Vec::new()
            })
            .into_iter()
            .collect();

        let mut seen = existing;
        let mut accepted = Vec::new();

        for variant in variants {
            let normalized = normalize_alias(&variant);

            if normalized.is_empty() || seen.contains(&normalized) {
                continue;
            }

            seen.insert(normalized.clone());
            accepted.push(normalized);
        }

        if accepted.is_empty() {
            debug!(topic = %topic_id, "no new alias variants to store");
            return Ok(());
        }

        let vectors = self
            .embeddings
            .embed_batch(&accepted)
            .await
            .map_err(|e| DomainError::population(format!("variant embedding: {}", e)))?;

        let mut stored = 0usize;

        for (variant, vector) in accepted.iter().zip(vectors) {
            let entry = AliasEntry::new(variant, topic_id.clone(), vector, self.alias_ttl);

            if let Err(e) = self.aliases.put(entry).await {
                warn!(topic = %topic_id, alias = %variant, error = %e, "skipping alias write");
                continue;
            }

            if let Err(e) = self.topics.add_alias(&topic_id, variant).await {
                warn!(topic = %topic_id, alias = %variant, error = %e, "alias stored but not indexed");
            }

            stored += 1;
        }

        info!(topic = %topic_id, stored, "population complete");

        Ok(())
    }
}
