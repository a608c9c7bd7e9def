//! Redis store implementations
//!
//! Key scheme:
//! - `data:<topic_id>` - serialized canonical topic, expiring with its TTL
//! - `emb:<alias_text>` - serialized alias entry (embedding included)
//! - `canonical:<topic_id>:aliases` - JSON list forming the reverse index

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::alias::{normalize_alias, AliasEntry, AliasStore};
use crate::domain::topic::{CanonicalTopic, TopicId, TopicStore};
use crate::domain::DomainError;

const PREFIX_DATA: &str = "data:";
const PREFIX_EMBEDDING: &str = "emb:";
const PREFIX_CANONICAL: &str = "canonical:";

/// Configuration for the Redis stores
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379")
    pub url: String,
    /// Optional key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Connect both stores over one managed connection
pub async fn connect(
    config: RedisStoreConfig,
) -> Result<(RedisAliasStore, RedisTopicStore), DomainError> {
    let client = Client::open(config.url.as_str())
        .map_err(|e| DomainError::store(format!("Failed to create Redis client: {}", e)))?;

    let connection = ConnectionManager::new(client)
        .await
        .map_err(|e| DomainError::store(format!("Failed to connect to Redis: {}", e)))?;

    Ok((
        RedisAliasStore {
            connection: connection.clone(),
            config: config.clone(),
        },
        RedisTopicStore { connection, config },
    ))
}

fn prefix_key(config: &RedisStoreConfig, key: &str) -> String {
    match &config.key_prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

async fn scan_keys(
    connection: &ConnectionManager,
    pattern: &str,
) -> Result<Vec<String>, DomainError> {
    let mut conn = connection.clone();
    let mut cursor = 0u64;
    let mut keys = Vec::new();

    loop {
        let (new_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(100)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::store(format!("Failed to scan keys: {}", e)))?;

        keys.extend(batch);
        cursor = new_cursor;

        if cursor == 0 {
            break;
        }
    }

    Ok(keys)
}

/// Redis-backed alias store
#[derive(Clone)]
pub struct RedisAliasStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisAliasStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisAliasStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisAliasStore {
    fn entry_key(&self, alias: &str) -> String {
        prefix_key(&self.config, &format!("{}{}", PREFIX_EMBEDDING, alias))
    }
}

#[async_trait]
impl AliasStore for RedisAliasStore {
    async fn put(&self, entry: AliasEntry) -> Result<(), DomainError> {
        let key = self.entry_key(entry.text());
        let ttl_secs = entry.ttl().as_secs().max(1);
        let value = serde_json::to_string(&entry)
            .map_err(|e| DomainError::internal(format!("Failed to serialize alias: {}", e)))?;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| DomainError::store(format!("Failed to set alias '{}': {}", entry.text(), e)))?;

        Ok(())
    }

    async fn get(&self, alias: &str) -> Result<Option<AliasEntry>, DomainError> {
        let key = self.entry_key(&normalize_alias(alias));
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| DomainError::store(format!("Failed to get alias '{}': {}", alias, e)))?;

        match raw {
            Some(raw) => {
                let entry: AliasEntry = serde_json::from_str(&raw).map_err(|e| {
                    DomainError::internal(format!("Failed to deserialize alias: {}", e))
                })?;
                Ok(Some(entry).filter(|e| !e.is_expired()))
            }
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<AliasEntry>, DomainError> {
        let pattern = prefix_key(&self.config, &format!("{}*", PREFIX_EMBEDDING));
        let keys = scan_keys(&self.connection, &pattern).await?;

        let mut conn = self.connection.clone();
        let mut entries = Vec::with_capacity(keys.len());

        for key in keys {
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| DomainError::store(format!("Failed to get key '{}': {}", key, e)))?;

            // entries may vanish between SCAN and GET; skip unparseable
            // leftovers rather than failing the whole snapshot
            if let Some(raw) = raw {
                if let Ok(entry) = serde_json::from_str::<AliasEntry>(&raw) {
                    if !entry.is_expired() {
                        entries.push(entry);
                    }
                }
            }
        }

        Ok(entries)
    }

    async fn delete(&self, alias: &str) -> Result<bool, DomainError> {
        let key = self.entry_key(&normalize_alias(alias));
        let mut conn = self.connection.clone();

        let deleted: i32 = conn
            .del(&key)
            .await
            .map_err(|e| DomainError::store(format!("Failed to delete alias '{}': {}", alias, e)))?;

        Ok(deleted > 0)
    }

    async fn expire(&self) -> Result<usize, DomainError> {
        // entries are written with SETEX; Redis removes them natively
        Ok(0)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let pattern = prefix_key(&self.config, &format!("{}*", PREFIX_EMBEDDING));
        Ok(scan_keys(&self.connection, &pattern).await?.len())
    }
}

/// Redis-backed canonical topic store
#[derive(Clone)]
pub struct RedisTopicStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisTopicStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisTopicStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisTopicStore {
    fn data_key(&self, id: &TopicId) -> String {
        prefix_key(&self.config, &format!("{}{}", PREFIX_DATA, id))
    }

    fn aliases_key(&self, id: &TopicId) -> String {
        prefix_key(&self.config, &format!("{}{}:aliases", PREFIX_CANONICAL, id))
    }
}

#[async_trait]
impl TopicStore for RedisTopicStore {
    async fn get(&self, id: &TopicId) -> Result<Option<CanonicalTopic>, DomainError> {
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn
            .get(self.data_key(id))
            .await
            .map_err(|e| DomainError::store(format!("Failed to get topic '{}': {}", id, e)))?;

        match raw {
            Some(raw) => {
                let topic: CanonicalTopic = serde_json::from_str(&raw).map_err(|e| {
                    DomainError::internal(format!("Failed to deserialize topic: {}", e))
                })?;
                Ok(Some(topic).filter(|t| !t.is_expired()))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, topic: CanonicalTopic) -> Result<(), DomainError> {
        let key = self.data_key(topic.id());
        let ttl_secs = topic.ttl().as_secs().max(1);
        let value = serde_json::to_string(&topic)
            .map_err(|e| DomainError::internal(format!("Failed to serialize topic: {}", e)))?;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| DomainError::store(format!("Failed to set topic '{}': {}", topic.id(), e)))?;

        Ok(())
    }

    async fn aliases_for(&self, id: &TopicId) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn
            .get(self.aliases_key(id))
            .await
            .map_err(|e| DomainError::store(format!("Failed to get aliases for '{}': {}", id, e)))?;

        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| DomainError::internal(format!("Failed to deserialize aliases: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    async fn add_alias(&self, id: &TopicId, alias: &str) -> Result<(), DomainError> {
        let normalized = normalize_alias(alias);
        let mut aliases = self.aliases_for(id).await?;

        if aliases.contains(&normalized) {
            return Ok(());
        }

        aliases.push(normalized);

        let value = serde_json::to_string(&aliases)
            .map_err(|e| DomainError::internal(format!("Failed to serialize aliases: {}", e)))?;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set(self.aliases_key(id), value)
            .await
            .map_err(|e| DomainError::store(format!("Failed to set aliases for '{}': {}", id, e)))?;

        Ok(())
    }

    async fn delete(&self, id: &TopicId) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let deleted: i32 = conn
            .del(vec![self.data_key(id), self.aliases_key(id)])
            .await
            .map_err(|e| DomainError::store(format!("Failed to delete topic '{}': {}", id, e)))?;

        Ok(deleted > 0)
    }

    async fn expire(&self) -> Result<usize, DomainError> {
        // topics are written with SETEX; Redis removes them natively
        Ok(0)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let pattern = prefix_key(&self.config, &format!("{}*", PREFIX_DATA));
        Ok(scan_keys(&self.connection, &pattern).await?.len())
    }
}
