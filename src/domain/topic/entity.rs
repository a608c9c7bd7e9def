//! Canonical topic entity

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::payload::TopicPayload;
use super::slug::derive_slug;

/// Stable, human-readable identifier of a canonical topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Wrap an existing slug
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from the query that is creating the topic
    pub fn from_query(query: &str) -> Self {
        Self(derive_slug(query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// The stable unit of cached knowledge a query resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalTopic {
    id: TopicId,
    payload: TopicPayload,
    created_at: u64,
    expires_at: u64,
}

impl CanonicalTopic {
    /// Create a new topic with the given time to live
    pub fn new(id: TopicId, payload: TopicPayload, ttl: Duration) -> Self {
        let now = now_secs();

        Self {
            id,
            payload,
            created_at: now,
            expires_at: now + ttl.as_secs(),
        }
    }

    pub fn id(&self) -> &TopicId {
        &self.id
    }

    pub fn payload(&self) -> &TopicPayload {
        &self.payload
    }

    pub fn into_payload(self) -> TopicPayload {
        self.payload
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Remaining time to live, zero if already expired
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_at.saturating_sub(now_secs()))
    }

    pub fn is_expired(&self) -> bool {
        now_secs() >= self.expires_at
    }
}
