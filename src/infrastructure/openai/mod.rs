//! OpenAI-backed collaborator implementations

mod alias_generator;
mod arbiter;
mod chat;
mod embedding;
mod extractor;
mod http_client;
mod synthesizer;

pub use alias_generator::OpenAiAliasGenerator;
pub use arbiter::OpenAiArbiter;
pub use chat::{ChatClient, TextChunkStream};
pub use embedding::OpenAiEmbeddingProvider;
pub use extractor::OpenAiExtractor;
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use synthesizer::OpenAiSynthesizer;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
