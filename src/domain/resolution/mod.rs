//! Semantic cache resolution engine

mod arbiter;
mod policy;
mod resolver;
mod result;

pub use arbiter::Arbiter;
pub use policy::{ResolutionPolicy, ResolutionPolicyConfig};
pub use resolver::SimilarityResolver;
pub use result::{
    Resolution, ResolutionTier, ResolverMatch, CANDIDATE_THRESHOLD, CONFIDENT_THRESHOLD,
};

#[cfg(test)]
pub use arbiter::mock::MockArbiter;
