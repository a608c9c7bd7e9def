//! Alias entry entity

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::topic::TopicId;

/// Normalize alias text for storage and lookup
///
/// Whitespace is trimmed and collapsed; Latin script is lowercased while
/// Arabic is preserved as written.
pub fn normalize_alias(text: &str) -> String {
    crate::domain::topic::normalize_query(text)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A text string known to refer to a canonical topic, with its embedding
///
/// Invariant: an alias text maps to exactly one topic id at any time; a
/// `put` of the same text overwrites the prior mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    text: String,
    topic_id: TopicId,
    embedding: Vec<f32>,
    created_at: u64,
    expires_at: u64,
}

impl AliasEntry {
    /// Create a new alias entry with normalized text
    pub fn new(
        text: impl AsRef<str>,
        topic_id: TopicId,
        embedding: Vec<f32>,
        ttl: Duration,
    ) -> Self {
        let now = now_secs();

        Self {
            text: normalize_alias(text.as_ref()),
            topic_id,
            embedding,
            created_at: now,
            expires_at: now + ttl.as_secs(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
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

    #[cfg(test)]
    pub(crate) fn backdate(mut self, seconds: u64) -> Self {
        self.created_at = self.created_at.saturating_sub(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_entry_normalizes_text() {
        let entry = AliasEntry::new(
            "  Course   REGISTRATION ",
            TopicId::new("course_registration"),
            vec![0.1, 0.2],
            Duration::from_secs(3600),
        );

        assert_eq!(entry.text(), "course registration");
        assert_eq!(entry.topic_id().as_str(), "course_registration");
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_alias_entry_preserves_arabic() {
        let entry = AliasEntry::new(
            "تسجيل المواد",
            TopicId::new("course_registration"),
            vec![1.0],
            Duration::from_secs(60),
        );

        assert_eq!(entry.text(), "تسجيل المواد");
    }

    #[test]
    fn test_alias_entry_expiry() {
        let mut entry = AliasEntry::new(
            "fees",
            TopicId::new("tuition_fees"),
            vec![1.0],
            Duration::from_secs(3600),
        );
        entry.expires_at = 0;

        assert!(entry.is_expired());
    }
}
