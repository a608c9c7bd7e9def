//! Campus Assistant API
//!
//! Semantic-cache question answering for campus services. Incoming queries
//! are resolved against a growing vocabulary of alias embeddings; only
//! unresolved queries pay for live data acquisition and answer synthesis,
//! and newly-seen phrasings are folded back into the cache in the
//! background.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::StoreBackend;
use domain::alias::{AliasGenerator, AliasStore};
use domain::embedding::EmbeddingProvider;
use domain::extraction::{ExtractionProvider, ResourceCatalog};
use domain::resolution::{Arbiter, ResolutionPolicy, ResolutionPolicyConfig, SimilarityResolver};
use domain::synthesis::AnswerSynthesizer;
use domain::topic::TopicStore;
use infrastructure::openai::{
    ChatClient, HttpClient, OpenAiAliasGenerator, OpenAiArbiter, OpenAiEmbeddingProvider,
    OpenAiExtractor, OpenAiSynthesizer,
};
use infrastructure::population::{InFlightPopulations, PopulationPipeline};
use infrastructure::services::{QueryService, QueryServiceConfig};
use infrastructure::store::{
    connect_redis, InMemoryAliasStore, InMemoryTopicStore, RedisStoreConfig,
};
use tracing::info;

/// Build the two stores for the configured backend
pub async fn build_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn AliasStore>, Arc<dyn TopicStore>)> {
    match config.store.backend {
        StoreBackend::Redis => {
            let mut store_config = RedisStoreConfig::new(&config.store.redis_url);

            if let Some(prefix) = &config.store.key_prefix {
                store_config = store_config.with_key_prefix(prefix);
            }

            info!(url = %config.store.redis_url, "connecting to Redis");
            let (aliases, topics) = connect_redis(store_config).await?;

            Ok((Arc::new(aliases), Arc::new(topics)))
        }
        StoreBackend::Memory => {
            info!("using in-memory stores");
            Ok((
                Arc::new(InMemoryAliasStore::new()),
                Arc::new(InMemoryTopicStore::new()),
            ))
        }
    }
}

/// Build the embedding provider for the configured OpenAI account
pub fn build_embedding_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    if config.openai.api_key.is_empty() {
        anyhow::bail!("openai.api_key is required (set APP__OPENAI__API_KEY)");
    }

    let http = HttpClient::with_timeout(Duration::from_secs(config.openai.request_timeout_secs))?;

    Ok(Arc::new(OpenAiEmbeddingProvider::with_base_url(
        http,
        &config.openai.api_key,
        &config.openai.embedding_model,
        &config.openai.base_url,
    )))
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (aliases, topics) = build_stores(config).await?;
    let embeddings = build_embedding_provider(config)?;

    let http = HttpClient::with_timeout(Duration::from_secs(config.openai.request_timeout_secs))?;
    let chat = Arc::new(
        ChatClient::with_base_url(
            http,
            &config.openai.api_key,
            &config.openai.chat_model,
            &config.openai.base_url,
        )
        .with_retry(
            config.openai.max_retries,
            Duration::from_millis(config.openai.retry_delay_ms),
        ),
    );

    let arbiter: Arc<dyn Arbiter> = Arc::new(OpenAiArbiter::new(chat.clone()));
    let extractor: Arc<dyn ExtractionProvider> = Arc::new(OpenAiExtractor::new(chat.clone()));
    let generator: Arc<dyn AliasGenerator> = Arc::new(OpenAiAliasGenerator::new(chat.clone()));
    let synthesizer: Arc<dyn AnswerSynthesizer> = Arc::new(OpenAiSynthesizer::new(chat));

    let topic_ttl = Duration::from_secs(config.store.topic_ttl_secs);
    let alias_ttl = Duration::from_secs(config.store.alias_ttl_secs);

    let policy = ResolutionPolicy::new(
        SimilarityResolver::new(aliases.clone()),
        embeddings.clone(),
        arbiter,
        aliases.clone(),
        topics.clone(),
        ResolutionPolicyConfig {
            arbiter_timeout: Duration::from_secs(config.resolution.arbiter_timeout_secs),
            alias_ttl,
        },
    );

    let population = Arc::new(PopulationPipeline::new(
        aliases.clone(),
        topics.clone(),
        generator,
        embeddings,
        InFlightPopulations::new(),
        alias_ttl,
    ));

    let resources = config
        .resources_file
        .as_deref()
        .map(ResourceCatalog::load)
        .unwrap_or_default();

    let query_service = Arc::new(QueryService::new(
        policy,
        topics,
        aliases,
        extractor,
        synthesizer,
        population,
        resources,
        QueryServiceConfig {
            topic_ttl,
            alias_ttl,
        },
    ));

    Ok(AppState::new(query_service))
}
