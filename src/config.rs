//! Configuration for the retrieval system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Source document configuration
    #[serde(default)]
    pub document: DocumentConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Persisted index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat session configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::invalid_configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            tracing::warn!("retrieval.top_k is 0; every query will return no passages");
        }
        Ok(())
    }
}

/// Source document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Path to the document to index
    pub source_path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("Sample Policies.pdf"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub overlap_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap_size: 150,
        }
    }
}

impl ChunkingConfig {
    /// Reject window/overlap combinations the chunker cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::invalid_configuration(
                "chunking.max_chunk_size must be greater than 0",
            ));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(Error::invalid_configuration(format!(
                "chunking.overlap_size ({}) must be smaller than chunking.max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Persisted index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Storage location for the serialized index
    pub storage_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("policy-rag")
            .join("index.json");
        Self { storage_path }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub embedding_dimensions: usize,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            embedding_dimensions: 768,
            generate_model: "llama3.2:1b".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Directory for per-session history logs
    pub sessions_dir: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let sessions_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("policy-rag")
            .join("sessions");
        Self { sessions_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        RagConfig::default().validate().unwrap();
    }

    #[test]
    fn overlap_not_smaller_than_chunk_size_is_rejected() {
        let chunking = ChunkingConfig {
            max_chunk_size: 100,
            overlap_size: 100,
        };
        assert!(matches!(
            chunking.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let chunking = ChunkingConfig {
            max_chunk_size: 0,
            overlap_size: 0,
        };
        assert!(matches!(
            chunking.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
