//! The `seed` subcommand
//!
//! Bootstraps the stores from a JSON file of predefined topics and aliases:
//!
//! ```json
//! [
//!   {
//!     "id": "course_registration",
//!     "payload": {"title": "Course Registration", "summary": "..."},
//!     "aliases": ["تسجيل", "registration", "how to register"]
//!   }
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::alias::{normalize_alias, AliasEntry};
use crate::domain::topic::{CanonicalTopic, TopicId, TopicPayload};
use crate::infrastructure::logging::{init_logging, LoggingConfig};

#[derive(Debug, Deserialize)]
struct SeedEntry {
    id: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    aliases: Vec<String>,
}

pub async fn run(file: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    let (aliases, topics) = crate::build_stores(&config).await?;
    let embeddings = crate::build_embedding_provider(&config)?;

    let contents = std::fs::read_to_string(file)?;
    let entries: Vec<SeedEntry> = serde_json::from_str(&contents)?;

    let topic_ttl = Duration::from_secs(config.store.topic_ttl_secs);
    let alias_ttl = Duration::from_secs(config.store.alias_ttl_secs);

    let mut total_aliases = 0usize;

    for entry in &entries {
        let topic_id = TopicId::new(&entry.id);

        if let Some(raw) = &entry.payload {
            let payload = TopicPayload::from_json(raw);

            if !payload.is_empty() {
                topics
                    .put(CanonicalTopic::new(topic_id.clone(), payload, topic_ttl))
                    .await?;
            }
        }

        for alias in &entry.aliases {
            if normalize_alias(alias).is_empty() {
                continue;
            }

            let vector = match embeddings.embed(alias).await {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(alias = %alias, error = %e, "skipping alias, embedding failed");
                    continue;
                }
            };

            aliases
                .put(AliasEntry::new(alias, topic_id.clone(), vector, alias_ttl))
                .await?;
            topics.add_alias(&topic_id, alias).await?;
            total_aliases += 1;
        }

        info!(topic = %topic_id, aliases = entry.aliases.len(), "seeded topic");
    }

    info!(
        topics = entries.len(),
        aliases = total_aliases,
        "seeding complete"
    );

    Ok(())
}
