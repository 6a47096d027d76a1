//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for LLM-based answer generation
///
/// Implementations:
/// - `AnthropicClient`: Anthropic Messages API (Claude)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for an already filled prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
