//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// External collaborator that turns text into fixed-dimension vectors
///
/// Repeated calls on identical text must yield vectors whose cosine
/// similarity with themselves is 1.0; individual calls may fail transiently.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for text in texts {
            vectors.push(self.embed(text).await?);
        }

        Ok(vectors)
    }

    /// The vector dimension this provider produces
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Deterministic test provider
    ///
    /// Texts can be scripted to exact vectors (for similarity-sensitive
    /// scenarios); everything else gets a stable hash-derived vector.
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        scripted: RwLock<HashMap<String, Vec<f32>>>,
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                scripted: RwLock::new(HashMap::new()),
                error: None,
            }
        }

        /// Pin a text to an exact vector
        pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.scripted.write().unwrap().insert(text.into(), vector);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        fn hash_vector(&self, text: &str) -> Vec<f32> {
            let hash = text.bytes().fold(0u64, |acc, b| {
                acc.wrapping_mul(31).wrapping_add(b as u64)
            });

            (0..self.dimensions)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::embedding(error));
            }

            if let Some(vector) = self.scripted.read().unwrap().get(text) {
                return Ok(vector.clone());
            }

            Ok(self.hash_vector(text))
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::embedding::cosine_similarity;

        #[tokio::test]
        async fn test_deterministic_embeddings() {
            let provider = MockEmbeddingProvider::new(64);

            let first = provider.embed("hello").await.unwrap();
            let second = provider.embed("hello").await.unwrap();

            assert_eq!(first, second);
            assert!((cosine_similarity(&first, &second) - 1.0).abs() < 0.0001);
        }

        #[tokio::test]
        async fn test_scripted_vector() {
            let provider = MockEmbeddingProvider::new(2).with_vector("fees", vec![1.0, 0.0]);

            assert_eq!(provider.embed("fees").await.unwrap(), vec![1.0, 0.0]);
        }

        #[tokio::test]
        async fn test_batch_preserves_order() {
            let provider = MockEmbeddingProvider::new(8);
            let texts = vec!["a".to_string(), "b".to_string()];

            let batch = provider.embed_batch(&texts).await.unwrap();

            assert_eq!(batch.len(), 2);
            assert_eq!(batch[0], provider.embed("a").await.unwrap());
            assert_eq!(batch[1], provider.embed("b").await.unwrap());
        }

        #[tokio::test]
        async fn test_error_mode() {
            let provider = MockEmbeddingProvider::new(8).with_error("down");
            assert!(provider.embed("x").await.is_err());
        }
    }
}
