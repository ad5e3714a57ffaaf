//! Answer composition from retrieved passages

pub mod prompt;

pub use prompt::PromptBuilder;

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::SearchResult;

/// Message returned when retrieval produces no passages
const NO_MATCH_ANSWER: &str = "I could not find any policy text that answers that question.";

/// Composes natural-language answers from retrieved chunks
///
/// Receives read-only query results; never touches the index itself.
pub struct AnswerComposer {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerComposer {
    /// Create a new composer
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Turn retrieved passages into a human-friendly answer
    pub async fn answer(&self, question: &str, results: &[SearchResult]) -> Result<String> {
        if results.is_empty() {
            return Ok(NO_MATCH_ANSWER.to_string());
        }

        let context = PromptBuilder::build_context(results);
        self.llm.generate_answer(question, &context).await
    }

    /// Model identifier for logging and session records
    pub fn model(&self) -> &str {
        self.llm.model()
    }
}
