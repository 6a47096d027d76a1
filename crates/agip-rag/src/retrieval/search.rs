//! Exact cosine-similarity index over chunk embeddings

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (higher is better)
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexRecord {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Flat vector index; records keep insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    records: Vec<IndexRecord>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Create an empty index for vectors of `dimension`
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add a chunk with its embedding
    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.records.push(IndexRecord { chunk, vector });
        Ok(())
    }

    /// The `top_k` most similar chunks, most similar first.
    ///
    /// Chunks scoring below `min_score` are dropped. Equal scores keep
    /// insertion order.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredChunk> = self
            .records
            .iter()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                similarity: cosine_similarity(&record.vector, query),
            })
            .filter(|result| min_score.map_or(true, |min| result.similarity >= min))
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    /// Get chunk count
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.records.iter().map(|record| &record.chunk)
    }

    /// Whether every stored vector has the index dimension
    pub fn is_consistent(&self) -> bool {
        self.records.iter().all(|r| r.vector.len() == self.dimension)
    }
}
