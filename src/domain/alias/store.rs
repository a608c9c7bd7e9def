//! Vector store trait for alias embeddings

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::AliasEntry;
use crate::domain::DomainError;

/// Persistent mapping from alias text to (topic id, embedding), with TTL
///
/// The resolver scans `all()` linearly; the snapshot only needs to be
/// consistent enough. A population run racing the scan may not be visible
/// yet, which can only cause a temporary miss. Implementations fail with
/// `DomainError::Store` when the persistence layer is unreachable.
#[async_trait]
pub trait AliasStore: Send + Sync + Debug {
    /// Upsert an entry, overwriting any prior mapping for the same text
    async fn put(&self, entry: AliasEntry) -> Result<(), DomainError>;

    /// Fetch a single entry by normalized alias text
    async fn get(&self, alias: &str) -> Result<Option<AliasEntry>, DomainError>;

    /// Snapshot of all live entries
    async fn all(&self) -> Result<Vec<AliasEntry>, DomainError>;

    /// Remove an entry by normalized alias text
    async fn delete(&self, alias: &str) -> Result<bool, DomainError>;

    /// Sweep expired entries, returning how many were removed
    async fn expire(&self) -> Result<usize, DomainError>;

    /// Number of live entries
    async fn len(&self) -> Result<usize, DomainError>;
}
