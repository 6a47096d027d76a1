//! Fixed-dimension embedding with a zero-vector fallback
//!
//! [`Embedder`] wraps any [`EmbeddingProvider`] and guarantees that every
//! returned vector has the configured dimension. Provider failures are
//! logged and degrade to zero vectors, so retrieval sees "no similarity"
//! instead of an error.

pub mod tfidf;

use std::sync::Arc;

use crate::providers::EmbeddingProvider;

pub use tfidf::{TfidfEmbedder, TfidfModel, TfidfVectorizer};

/// Dimension-enforcing facade over an embedding provider
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimension: usize) -> Self {
        Self {
            provider,
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Embed a batch; one vector per input text
    pub async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }

        match self.provider.embed_batch(texts).await {
            Ok(vectors) if vectors.len() == texts.len() => vectors
                .into_iter()
                .map(|v| self.ensure_dimension(v))
                .collect(),
            Ok(vectors) => {
                tracing::error!(
                    provider = self.provider.name(),
                    expected = texts.len(),
                    returned = vectors.len(),
                    "Embedding provider returned the wrong number of vectors, using zero vectors"
                );
                vec![self.zero_vector(); texts.len()]
            }
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    error = %e,
                    "Embedding failed, using zero vectors"
                );
                vec![self.zero_vector(); texts.len()]
            }
        }
    }

    /// Embed a single query string
    pub async fn embed_query(&self, text: &str) -> Vec<f32> {
        match self.provider.embed(text).await {
            Ok(vector) => self.ensure_dimension(vector),
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    error = %e,
                    "Query embedding failed, using zero vector"
                );
                self.zero_vector()
            }
        }
    }

    /// Zero-pad or truncate to the configured dimension
    fn ensure_dimension(&self, mut vector: Vec<f32>) -> Vec<f32> {
        vector.resize(self.dimension, 0.0);
        vector
    }

    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dimension]
    }
}
