//! Domain layer - Core entities, traits, and the resolution engine

pub mod alias;
pub mod embedding;
pub mod error;
pub mod extraction;
pub mod resolution;
pub mod synthesis;
pub mod topic;

pub use alias::{AliasEntry, AliasGenerator, AliasStore};
pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use error::DomainError;
pub use extraction::{ExtractionProvider, ResourceCatalog};
pub use resolution::{
    Arbiter, Resolution, ResolutionPolicy, ResolutionPolicyConfig, ResolutionTier,
    SimilarityResolver,
};
pub use synthesis::{render_fallback, AnswerSource, AnswerStream, AnswerSynthesizer};
pub use topic::{CanonicalTopic, TopicId, TopicPayload, TopicStore};
