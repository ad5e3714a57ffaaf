//! Single-document file parser

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Document, FileType};

use super::chunker::TextChunker;

/// Parsed document with extracted text and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Document metadata
    pub document: Document,
    /// Extracted text content
    pub content: String,
    /// Page-level offsets (for PDFs)
    pub pages: Vec<PageContent>,
}

/// Content boundaries of a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Character offset of the page start in the full text
    pub char_offset: usize,
}

/// Loads one source document and splits it into chunks
pub struct DocumentLoader;

impl DocumentLoader {
    /// Read and parse a document from disk
    pub fn load(path: &Path) -> Result<ParsedDocument> {
        if !path.exists() {
            return Err(Error::document_unreadable(
                path.display().to_string(),
                "file not found",
            ));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let file_type = FileType::from_extension(&extension);

        if !file_type.is_supported() {
            return Err(Error::document_unreadable(
                path.display().to_string(),
                format!("unsupported file type '.{}'", extension),
            ));
        }

        let data = std::fs::read(path).map_err(|e| {
            Error::document_unreadable(path.display().to_string(), e.to_string())
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let content = match file_type {
            FileType::Pdf => Self::extract_pdf_text(path, &data)?,
            FileType::Txt | FileType::Markdown => {
                String::from_utf8(data.clone()).map_err(|e| {
                    Error::document_unreadable(path.display().to_string(), e.to_string())
                })?
            }
            FileType::Unknown => unreachable!("rejected above"),
        };

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(Error::document_unreadable(
                path.display().to_string(),
                "no text extracted",
            ));
        }

        let pages = Self::split_pages(&content);
        let content_hash = hash_bytes(&data);

        let mut document = Document::new(filename, file_type, content_hash, data.len() as u64);
        if pages.len() > 1 {
            document.total_pages = Some(pages.len() as u32);
        }

        Ok(ParsedDocument {
            document,
            content,
            pages,
        })
    }

    /// Load a document and split it into overlapping chunks
    ///
    /// The central ingestion entry point: chunks are at most
    /// `max_chunk_size` characters, each consecutive pair sharing
    /// `overlap_size` characters, in original document order.
    pub fn load_and_split(
        path: &Path,
        chunking: &ChunkingConfig,
    ) -> Result<(Document, Vec<Chunk>)> {
        chunking.validate()?;

        let parsed = Self::load(path)?;
        let chunker = TextChunker::new(chunking.max_chunk_size, chunking.overlap_size);
        let chunks = chunker.chunk_document(&parsed);

        tracing::info!(
            "Split '{}' into {} chunks (max {} chars, overlap {})",
            parsed.document.filename,
            chunks.len(),
            chunking.max_chunk_size,
            chunking.overlap_size
        );

        Ok((parsed.document, chunks))
    }

    /// Extract PDF text
    fn extract_pdf_text(path: &Path, data: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(data).map_err(|e| {
            Error::document_unreadable(path.display().to_string(), e.to_string())
        })
    }

    /// Derive page offsets from form-feed separators in the extracted text
    ///
    /// Offsets are in characters, matching chunk positions. A document with
    /// no separators is a single page starting at 0.
    fn split_pages(content: &str) -> Vec<PageContent> {
        let mut pages = Vec::new();
        let mut char_offset = 0usize;

        for (i, page_text) in content.split('\u{c}').enumerate() {
            pages.push(PageContent {
                page_number: i as u32 + 1,
                char_offset,
            });
            // +1 for the separator consumed by split
            char_offset += page_text.chars().count() + 1;
        }

        pages
    }
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash a file's contents (used to detect source drift on index load)
pub fn hash_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(hash_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_document_unreadable() {
        let err = DocumentLoader::load(Path::new("/nonexistent/policies.pdf")).unwrap_err();
        assert!(matches!(err, Error::DocumentUnreadable { .. }));
    }

    #[test]
    fn unsupported_extension_is_document_unreadable() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(b"not really a docx").unwrap();

        let err = DocumentLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::DocumentUnreadable { .. }));
    }

    #[test]
    fn empty_text_file_is_document_unreadable() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();

        let err = DocumentLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::DocumentUnreadable { .. }));
    }

    #[test]
    fn text_file_loads_with_hash_and_metadata() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"Employees accrue vacation monthly.").unwrap();

        let parsed = DocumentLoader::load(file.path()).unwrap();
        assert_eq!(parsed.content, "Employees accrue vacation monthly.");
        assert_eq!(parsed.document.file_type, FileType::Txt);
        assert_eq!(parsed.document.content_hash.len(), 64);
        assert_eq!(parsed.pages.len(), 1);
    }

    #[test]
    fn page_offsets_follow_form_feeds() {
        let pages = DocumentLoader::split_pages("first\u{c}second\u{c}third");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].char_offset, 0);
        assert_eq!(pages[1].char_offset, 6);
        assert_eq!(pages[2].char_offset, 13);
    }
}
