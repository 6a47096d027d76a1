//! Core types for the assistant

pub mod answer;
pub mod conversation;
pub mod document;

pub use answer::{AnswerOutcome, SourceRef};
pub use conversation::{ChatMessage, ChatSession, Conversation, ConversationTurn, Sentiment};
pub use document::{Chunk, ChunkMetadata, PageDocument};
