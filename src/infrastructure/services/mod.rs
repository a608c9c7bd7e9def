//! Application services

mod query_service;

pub use query_service::{
    AnswerContext, CacheStats, QueryAnswer, QueryService, QueryServiceConfig, StreamedAnswer,
};
