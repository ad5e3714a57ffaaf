//! Provider abstractions for embeddings and LLM answer generation
//!
//! Trait-based seams so the retrieval core stays independent of the
//! hosted-model backend.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
