//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams let the answering engine run against the real Claude client
//! or against stubs.

pub mod anthropic;
pub mod embedding;
pub mod llm;

pub use anthropic::AnthropicClient;
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
