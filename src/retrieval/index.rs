//! Persistent vector index over document chunks
//!
//! The index is built once from a chunked document, serialized to a single
//! file, and loaded wholesale on reuse. It is never partially mutated:
//! the only lifecycle is build -> persist -> load -> search.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, Document};

/// Bump when the serialized layout changes; older artifacts then fail
/// `load` as corrupt instead of being misread.
const FORMAT_VERSION: u32 = 1;

/// Distance metric used for ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity (higher is more similar)
    Cosine,
}

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Similarity score (higher is better)
    pub similarity: f32,
}

/// Serialized artifact layout
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    format_version: u32,
    dimensions: usize,
    metric: DistanceMetric,
    source_path: String,
    source_hash: String,
    built_at: chrono::DateTime<chrono::Utc>,
    chunks: Vec<Chunk>,
}

/// In-memory vector index
///
/// Read-only once constructed; concurrent `search` calls need no locking.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    metric: DistanceMetric,
    source_path: String,
    source_hash: String,
    built_at: chrono::DateTime<chrono::Utc>,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Check whether a persisted index is present, without loading it
    pub fn exists(storage_location: &Path) -> bool {
        storage_location.is_file()
    }

    /// Build a new in-memory index by embedding every chunk
    ///
    /// All-or-nothing: any embedding failure aborts the whole build, so a
    /// partial index can never be observed or persisted.
    pub async fn build(
        document: &Document,
        mut chunks: Vec<Chunk>,
        source_path: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let dimensions = embedder.dimensions();

        tracing::info!(
            "Embedding {} chunks with {} ({} dims)",
            chunks.len(),
            embedder.name(),
            dimensions
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            if embedding.len() != dimensions {
                return Err(Error::embedding(format!(
                    "provider returned {} dimensions, expected {}",
                    embedding.len(),
                    dimensions
                )));
            }
            chunk.embedding = embedding;
        }

        Ok(Self {
            dimensions,
            metric: DistanceMetric::Cosine,
            source_path: source_path.display().to_string(),
            source_hash: document.content_hash.clone(),
            built_at: chrono::Utc::now(),
            chunks,
        })
    }

    /// Load a previously persisted index
    pub fn load(storage_location: &Path) -> Result<Self> {
        let location = storage_location.display().to_string();
        let data = std::fs::read(storage_location)?;

        let persisted: PersistedIndex = serde_json::from_slice(&data)
            .map_err(|e| Error::corrupt_index(&location, e.to_string()))?;

        if persisted.format_version != FORMAT_VERSION {
            return Err(Error::corrupt_index(
                &location,
                format!(
                    "unknown format version {} (expected {})",
                    persisted.format_version, FORMAT_VERSION
                ),
            ));
        }

        for chunk in &persisted.chunks {
            if chunk.embedding.len() != persisted.dimensions {
                return Err(Error::corrupt_index(
                    &location,
                    format!(
                        "chunk {} has {} dimensions, index declares {}",
                        chunk.chunk_index,
                        chunk.embedding.len(),
                        persisted.dimensions
                    ),
                ));
            }
        }

        let index = Self {
            dimensions: persisted.dimensions,
            metric: persisted.metric,
            source_path: persisted.source_path,
            source_hash: persisted.source_hash,
            built_at: persisted.built_at,
            chunks: persisted.chunks,
        };

        index.warn_if_source_drifted();

        tracing::info!(
            "Loaded index from '{}': {} chunks, {} dims, built {}",
            location,
            index.chunks.len(),
            index.dimensions,
            index.built_at
        );

        Ok(index)
    }

    /// Serialize the index to durable storage
    ///
    /// Writes to a temporary file in the target directory and renames into
    /// place, so a concurrent reader never observes a partial artifact.
    pub fn persist(&self, storage_location: &Path) -> Result<()> {
        let parent = storage_location.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let persisted = PersistedIndex {
            format_version: FORMAT_VERSION,
            dimensions: self.dimensions,
            metric: self.metric,
            source_path: self.source_path.clone(),
            source_hash: self.source_hash.clone(),
            built_at: self.built_at,
            chunks: self.chunks.clone(),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer(&mut tmp, &persisted)?;
        tmp.persist(storage_location)
            .map_err(|e| Error::Io(e.error))?;

        tracing::info!(
            "Persisted index to '{}' ({} chunks)",
            storage_location.display(),
            self.chunks.len()
        );

        Ok(())
    }

    /// Return the k nearest chunks to the query vector, best match first
    ///
    /// Returns fewer than k if the index is small, and an empty sequence
    /// for an empty index or k = 0.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Vec<SearchResult> {
        assert_eq!(
            query_vector.len(),
            self.dimensions,
            "query vector dimensionality does not match the index"
        );

        if k == 0 || self.chunks.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                similarity: cosine_similarity(query_vector, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        results
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality of every entry
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Content hash of the source document at build time
    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    /// The persisted index stays authoritative until deleted; if the live
    /// source no longer matches the recorded hash, say so and move on.
    fn warn_if_source_drifted(&self) {
        let source = Path::new(&self.source_path);
        if !source.exists() {
            return;
        }
        match crate::ingestion::parser::hash_file(source) {
            Ok(hash) if hash != self.source_hash => {
                tracing::warn!(
                    "Source document '{}' changed since the index was built; \
                     delete the stored index and rerun to reindex",
                    self.source_path
                );
            }
            _ => {}
        }
    }
}

/// Cosine similarity with a zero-norm guard
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkSource;
    use async_trait::async_trait;
    use uuid::Uuid;

    /// Deterministic embedder: maps text onto a fixed 4-dim vector
    struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("vacation").count() as f32,
                lower.matches("sick").count() as f32,
                lower.matches("remote").count() as f32,
                1.0,
            ])
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    fn chunk(doc_id: Uuid, index: u32, content: &str) -> Chunk {
        Chunk::new(
            doc_id,
            content.to_string(),
            ChunkSource::text("policies.txt".to_string()),
            0,
            content.chars().count(),
            index,
        )
    }

    fn sample_document() -> Document {
        Document::new(
            "policies.txt".to_string(),
            crate::types::FileType::Txt,
            "deadbeef".to_string(),
            64,
        )
    }

    async fn sample_index() -> VectorIndex {
        let doc = sample_document();
        let chunks = vec![
            chunk(doc.id, 0, "Employees get 10 vacation days per year."),
            chunk(doc.id, 1, "Sick leave requires a doctor's note after three days."),
            chunk(doc.id, 2, "Remote work is allowed two days per week."),
        ];
        VectorIndex::build(&doc, chunks, Path::new("policies.txt"), &KeywordEmbedder)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let index = sample_index().await;
        let query = KeywordEmbedder.embed("How many vacation days?").await.unwrap();

        let results = index.search(&query, 3);
        assert_eq!(results.len(), 3);
        assert!(results[0].chunk.content.contains("vacation"));
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[tokio::test]
    async fn search_returns_at_most_k() {
        let index = sample_index().await;
        let query = KeywordEmbedder.embed("sick leave").await.unwrap();

        assert_eq!(index.search(&query, 2).len(), 2);
        assert_eq!(index.search(&query, 10).len(), 3);
    }

    #[tokio::test]
    async fn k_zero_returns_empty() {
        let index = sample_index().await;
        let query = KeywordEmbedder.embed("anything").await.unwrap();

        assert!(index.search(&query, 0).is_empty());
    }

    #[tokio::test]
    async fn empty_index_returns_empty_for_any_k() {
        let doc = sample_document();
        let index = VectorIndex::build(&doc, Vec::new(), Path::new("policies.txt"), &KeywordEmbedder)
            .await
            .unwrap();

        assert!(index.is_empty());
        assert!(index.search(&[0.0, 0.0, 0.0, 0.0], 5).is_empty());
    }

    #[tokio::test]
    async fn persist_load_round_trip_preserves_search_results() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("index.json");

        let index = sample_index().await;
        index.persist(&location).unwrap();

        let reloaded = VectorIndex::load(&location).unwrap();
        assert_eq!(reloaded.len(), index.len());
        assert_eq!(reloaded.dimensions(), index.dimensions());

        let query = KeywordEmbedder.embed("remote work policy").await.unwrap();
        let before: Vec<Uuid> = index.search(&query, 3).iter().map(|r| r.chunk.id).collect();
        let after: Vec<Uuid> = reloaded.search(&query, 3).iter().map(|r| r.chunk.id).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn exists_reflects_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("index.json");

        assert!(!VectorIndex::exists(&location));
        sample_index().await.persist(&location).unwrap();
        assert!(VectorIndex::exists(&location));
    }

    #[test]
    fn load_of_random_bytes_is_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("index.json");
        std::fs::write(&location, b"\x00\xffnot json at all\x17\x2a").unwrap();

        let err = VectorIndex::load(&location).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }

    #[tokio::test]
    async fn load_rejects_unknown_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("index.json");

        let index = sample_index().await;
        index.persist(&location).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&location).unwrap()).unwrap();
        value["format_version"] = serde_json::json!(99);
        std::fs::write(&location, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = VectorIndex::load(&location).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }

    #[tokio::test]
    async fn load_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("index.json");

        let index = sample_index().await;
        index.persist(&location).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&location).unwrap()).unwrap();
        value["dimensions"] = serde_json::json!(16);
        std::fs::write(&location, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = VectorIndex::load(&location).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
