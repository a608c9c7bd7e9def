//! Resolution tiers and per-query resolution values

use serde::{Deserialize, Serialize};

use crate::domain::topic::TopicId;

/// Similarity at or above this resolves without arbitration
pub const CONFIDENT_THRESHOLD: f32 = 0.70;

/// Similarity at or above this (but below confident) goes to the arbiter
pub const CANDIDATE_THRESHOLD: f32 = 0.50;

/// Resolution confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    Confident,
    Ambiguous,
    None,
}

impl ResolutionTier {
    /// Map a similarity score onto its tier
    ///
    /// Boundaries are inclusive at the lower edge: exactly 0.70 is
    /// confident, exactly 0.50 is ambiguous.
    pub fn from_score(score: f32) -> Self {
        if score >= CONFIDENT_THRESHOLD {
            Self::Confident
        } else if score >= CANDIDATE_THRESHOLD {
            Self::Ambiguous
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confident => "confident",
            Self::Ambiguous => "ambiguous",
            Self::None => "none",
        }
    }
}

/// The best match found by a resolver scan
#[derive(Debug, Clone)]
pub struct ResolverMatch {
    pub alias: String,
    pub topic_id: TopicId,
    pub score: f32,
}

/// Outcome of resolving one query, terminal after one policy pass
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Final tier after any arbitration and degradation
    pub tier: ResolutionTier,
    /// Resolved topic, present only when the tier ended confident
    pub topic_id: Option<TopicId>,
    /// Best-matching alias text, when any alias scored at all
    pub matched_alias: Option<String>,
    /// Best similarity score observed
    pub score: f32,
    /// The query embedding, carried forward so the orchestrator can register
    /// the originating query as an alias without re-embedding
    pub query_embedding: Option<Vec<f32>>,
}

impl Resolution {
    /// A resolution that found nothing (or degraded to nothing)
    pub fn none() -> Self {
        Self {
            tier: ResolutionTier::None,
            topic_id: None,
            matched_alias: None,
            score: 0.0,
            query_embedding: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.topic_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tier_boundaries() {
        assert_eq!(ResolutionTier::from_score(0.70), ResolutionTier::Confident);
        assert_eq!(ResolutionTier::from_score(0.50), ResolutionTier::Ambiguous);
        assert_eq!(ResolutionTier::from_score(0.4999), ResolutionTier::None);
    }

    #[test]
    fn test_tier_interior_values() {
        assert_eq!(ResolutionTier::from_score(0.99), ResolutionTier::Confident);
        assert_eq!(ResolutionTier::from_score(0.60), ResolutionTier::Ambiguous);
        assert_eq!(ResolutionTier::from_score(0.0), ResolutionTier::None);
        assert_eq!(ResolutionTier::from_score(-0.3), ResolutionTier::None);
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&ResolutionTier::Confident).unwrap(),
            r#""confident""#
        );
        assert_eq!(
            serde_json::to_string(&ResolutionTier::None).unwrap(),
            r#""none""#
        );
    }

    #[test]
    fn test_none_resolution() {
        let resolution = Resolution::none();
        assert!(!resolution.is_hit());
        assert_eq!(resolution.tier, ResolutionTier::None);
        assert_eq!(resolution.score, 0.0);
    }
}
