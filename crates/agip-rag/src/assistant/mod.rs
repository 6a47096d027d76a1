//! Answering engine: embed, retrieve, prompt, generate

mod engine;

pub use engine::{resolve_api_key_with, Assistant, AssistantBuilder};
