//! Arbiter trait for ambiguous matches

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// External collaborator making the final call on ambiguous matches
///
/// Must answer within the caller's time budget; the caller treats a timeout
/// as failure and degrades the match.
#[async_trait]
pub trait Arbiter: Send + Sync + Debug {
    /// Whether the query refers to the same topic as the candidate alias
    async fn confirm(
        &self,
        query: &str,
        candidate_alias: &str,
        candidate_summary: &str,
    ) -> Result<bool, DomainError>;
}
