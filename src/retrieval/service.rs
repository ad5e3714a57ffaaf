//! Retrieval service: build-if-absent index lifecycle and top-k query

use std::path::Path;
use std::sync::Arc;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::ingestion::DocumentLoader;
use crate::providers::EmbeddingProvider;

use super::index::{SearchResult, VectorIndex};

/// On-disk lifecycle of the index at a storage location
///
/// `Absent -> (build + persist) -> Persisted -> (load) -> in memory`.
/// There is no delete transition and no update path: the index is
/// immutable once built. Corruption and absence are distinct conditions;
/// a corrupt artifact fails `load` and never triggers a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexState {
    /// Nothing persisted at the storage location yet
    Absent,
    /// A persisted artifact is present
    Persisted,
}

impl IndexState {
    fn of(storage_location: &Path) -> Self {
        if VectorIndex::exists(storage_location) {
            Self::Persisted
        } else {
            Self::Absent
        }
    }
}

/// Document retrieval over a persistent vector index
///
/// Owns the index lifecycle: callers get an initialized service or an
/// error, never a half-built one. The loaded index is immutable, so the
/// service is cheap to share and `query` is safe to call concurrently.
pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("index", &self.index)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl RetrievalService {
    /// Open the service, building and persisting the index if absent
    ///
    /// Index construction (document parsing plus one embedding call per
    /// chunk) happens at most once per storage location. Later opens,
    /// including fresh processes, load the persisted artifact and never
    /// touch the source document or the embedding provider.
    pub async fn open(
        source_document_path: &Path,
        storage_location: &Path,
        chunking: &ChunkingConfig,
        top_k: usize,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let index = match IndexState::of(storage_location) {
            IndexState::Persisted => {
                tracing::info!(
                    "Reusing persisted index at '{}'",
                    storage_location.display()
                );
                VectorIndex::load(storage_location)?
            }
            IndexState::Absent => {
                tracing::info!(
                    "No index at '{}', building from '{}'",
                    storage_location.display(),
                    source_document_path.display()
                );
                let (document, chunks) =
                    DocumentLoader::load_and_split(source_document_path, chunking)?;
                let index = VectorIndex::build(
                    &document,
                    chunks,
                    source_document_path,
                    embedder.as_ref(),
                )
                .await?;
                index.persist(storage_location)?;
                index
            }
        };

        Ok(Self {
            embedder,
            index: Arc::new(index),
            top_k,
        })
    }

    /// Retrieve the top-k chunks relevant to a question
    ///
    /// An empty question is permitted: its degenerate embedding still
    /// ranks the index and the caller judges relevance. An empty result
    /// set is an answer, not an error.
    pub async fn query(&self, question: &str) -> Result<Vec<SearchResult>> {
        self.query_with_k(question, self.top_k).await
    }

    /// Retrieve with an explicit k
    pub async fn query_with_k(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed(question).await?;

        // Provider/index mismatch is a wiring bug, not a runtime condition
        assert_eq!(
            query_vector.len(),
            self.index.dimensions(),
            "embedding provider dimensionality does not match the index"
        );

        let results = self.index.search(&query_vector, k);
        tracing::debug!(
            "Query returned {} of {} requested chunks",
            results.len(),
            k
        );

        Ok(results)
    }

    /// The in-memory index (read-only)
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}
