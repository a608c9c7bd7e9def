//! Store implementations

mod in_memory;
mod redis;

pub use in_memory::{InMemoryAliasStore, InMemoryTopicStore};
pub use redis::{connect as connect_redis, RedisAliasStore, RedisStoreConfig, RedisTopicStore};
