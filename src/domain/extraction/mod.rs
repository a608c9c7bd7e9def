//! Data acquisition collaborator contract and resource hints

mod provider;
mod resources;

pub use provider::{fallback_payload, ExtractionProvider};
pub use resources::ResourceCatalog;

#[cfg(test)]
pub use provider::mock::MockExtractionProvider;
