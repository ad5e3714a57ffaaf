//! Prompt templates and query normalization

use crate::retrieval::SearchResult;

/// Prompt builder for retrieval-grounded generation
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build numbered context from search results
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[Passage {}] ({})\n{}\n\n",
                i + 1,
                result.chunk.source.format_citation(),
                result.chunk.content.trim()
            ));
        }

        context
    }

    /// Build a grounded question-answering prompt
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a policy explainer assistant. You summarize policy passages into clear, human-friendly answers.
- Use only the information in the retrieved passages.
- Prefer a direct, affirmative answer when the passages contain at least some relevant details.
- Only say that the passages do not answer the question when they contain no relevant policy content at all.

Retrieved passages:
{context}

Employee question: {question}

Answer:"#,
            context = context,
            question = question
        )
    }
}

/// Normalize a user query: lowercase, strip punctuation, collapse spaces
pub fn clean_query(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_punct = regex::Regex::new(r"[^\w\s]")
        .expect("invalid regex")
        .replace_all(&lowered, " ");
    regex::Regex::new(r"\s+")
        .expect("invalid regex")
        .replace_all(&no_punct, " ")
        .trim()
        .to_string()
}
