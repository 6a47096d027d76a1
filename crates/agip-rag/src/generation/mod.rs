//! Prompt construction and fixed assistant messages

pub mod messages;
pub mod prompt;

pub use prompt::PromptBuilder;
