//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating natural-language answers from retrieved context
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate an answer to a question given retrieved context
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;
}
