//! policy-rag: retrieval-augmented Q&A over a single policy document
//!
//! This crate ingests one document (PDF or plain text), chunks and embeds
//! it into a vector index persisted on disk, and answers natural-language
//! questions by retrieving the most relevant passages and forwarding them
//! to a hosted language model. The index is built at most once per storage
//! location; every later run reuses the persisted artifact.

pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::AnswerComposer;
pub use retrieval::{RetrievalService, SearchResult, VectorIndex};
pub use types::{Chunk, ChunkSource, Document, FileType};
