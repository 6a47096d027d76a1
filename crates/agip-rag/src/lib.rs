//! agip-rag: retrieval-augmented assistant for AGIP disability exemptions
//!
//! PDF regulations are ingested offline into a TF-IDF knowledge index. At
//! query time the most similar chunks are retrieved and Claude answers in
//! Spanish from that context only. The assistant is exposed as a library,
//! a CLI and a small HTTP API.

pub mod assistant;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use assistant::Assistant;
pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{IngestionPipeline, IngestionReport};
pub use types::{AnswerOutcome, ChatSession, Conversation};
