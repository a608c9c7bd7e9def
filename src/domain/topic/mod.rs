//! Canonical topic domain models and store trait

mod entity;
mod payload;
mod slug;
mod store;

pub use entity::{CanonicalTopic, TopicId};
pub use payload::{PayloadValue, TopicPayload};
pub use slug::{derive_slug, detect_language, normalize_query, Language};
pub use store::TopicStore;
