//! Error types for the retrieval system

use thiserror::Error;

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Retrieval system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source document missing, unreadable, or unparseable
    #[error("Failed to read document '{path}': {message}")]
    DocumentUnreadable { path: String, message: String },

    /// Configuration constraint violated
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Embedding provider returned an error
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailure(String),

    /// Persisted index is unreadable or internally inconsistent
    #[error("Corrupt index at '{path}': {message}")]
    CorruptIndex { path: String, message: String },

    /// External provider unreachable (network, auth)
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a document-unreadable error
    pub fn document_unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingFailure(message.into())
    }

    /// Create a corrupt-index error
    pub fn corrupt_index(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }
}
