//! Vector search and knowledge index persistence

pub mod retriever;
pub mod search;
pub mod store;

pub use retriever::{IndexRetriever, Retriever};
pub use search::{cosine_similarity, ScoredChunk, VectorIndex};
pub use store::{IndexManifest, KnowledgeBase};
