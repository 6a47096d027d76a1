//! Retriever seam between the answering engine and the index

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

use super::search::{ScoredChunk, VectorIndex};

/// Returns the chunks most similar to a query embedding
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` chunks, most similar first; empty when nothing qualifies
    async fn retrieve(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Get retriever name for logging
    fn name(&self) -> &str;
}

/// Retriever over an in-memory [`VectorIndex`]
pub struct IndexRetriever {
    index: Arc<VectorIndex>,
    min_score: Option<f32>,
}

impl IndexRetriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self {
            index,
            min_score: None,
        }
    }

    /// Drop chunks scoring below `min_score`
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        self.index.search(query_embedding, k, self.min_score)
    }

    fn name(&self) -> &str {
        "flat-cosine"
    }
}
