//! Text chunking with fixed-size overlapping windows

use crate::types::{Chunk, ChunkSource};

use super::parser::{PageContent, ParsedDocument};

/// A chunk's text and character span before source attribution
#[derive(Debug, Clone)]
pub struct ChunkSpan {
    /// Window text
    pub text: String,
    /// Character offset of the window start
    pub char_start: usize,
    /// Character offset one past the window end
    pub char_end: usize,
}

/// Text chunker with configurable window size and overlap
///
/// Windows are measured in characters and advance by
/// `max_size - overlap`, so consecutive windows share exactly `overlap`
/// characters and concatenating the non-overlapping portions reproduces
/// the input.
pub struct TextChunker {
    max_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// `max_size` must exceed `overlap` (validated by `ChunkingConfig`);
    /// a window no larger than the overlap has no forward step.
    pub fn new(max_size: usize, overlap: usize) -> Self {
        assert!(
            max_size > overlap,
            "chunk window ({}) must exceed overlap ({})",
            max_size,
            overlap
        );
        Self { max_size, overlap }
    }

    /// Chunk a parsed document, attributing each chunk to its page
    pub fn chunk_document(&self, parsed: &ParsedDocument) -> Vec<Chunk> {
        let doc = &parsed.document;

        self.split(&parsed.content)
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let source = Self::source_for(parsed, span.char_start);
                Chunk::new(
                    doc.id,
                    span.text,
                    source,
                    span.char_start,
                    span.char_end,
                    i as u32,
                )
            })
            .collect()
    }

    /// Split text into overlapping windows
    pub fn split(&self, text: &str) -> Vec<ChunkSpan> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character boundary, plus the end sentinel
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = boundaries.len() - 1;

        let mut spans = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.max_size).min(total_chars);
            spans.push(ChunkSpan {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                char_start: start,
                char_end: end,
            });

            if end == total_chars {
                break;
            }
            start = end - self.overlap;
        }

        spans
    }

    /// Find the page containing a character offset
    fn source_for(parsed: &ParsedDocument, char_start: usize) -> ChunkSource {
        let doc = &parsed.document;

        if parsed.pages.len() > 1 {
            let page = page_at(&parsed.pages, char_start);
            ChunkSource {
                filename: doc.filename.clone(),
                file_type: doc.file_type.clone(),
                page_number: Some(page),
                page_count: doc.total_pages,
            }
        } else {
            ChunkSource {
                filename: doc.filename.clone(),
                file_type: doc.file_type.clone(),
                page_number: None,
                page_count: None,
            }
        }
    }
}

/// Page number (1-indexed) whose span contains the given character offset
fn page_at(pages: &[PageContent], char_offset: usize) -> u32 {
    match pages.binary_search_by(|p| p.char_offset.cmp(&char_offset)) {
        Ok(i) => pages[i].page_number,
        Err(0) => 1,
        Err(i) => pages[i - 1].page_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(spans: &[ChunkSpan], overlap: usize) -> String {
        let mut text = String::new();
        for (i, span) in spans.iter().enumerate() {
            if i == 0 {
                text.push_str(&span.text);
            } else {
                text.extend(span.text.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn windows_respect_max_size() {
        let chunker = TextChunker::new(10, 3);
        let spans = chunker.split("The quick brown fox jumps over the lazy dog");

        for span in &spans {
            assert!(span.text.chars().count() <= 10);
        }
    }

    #[test]
    fn consecutive_windows_share_exact_overlap() {
        let chunker = TextChunker::new(10, 3);
        let spans = chunker.split("abcdefghijklmnopqrstuvwxyz0123456789");

        for pair in spans.windows(2) {
            let tail: String = pair[0].text.chars().skip(pair[0].text.chars().count() - 3).collect();
            let head: String = pair[1].text.chars().take(3).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn non_overlapping_portions_reconstruct_input() {
        let text = "Annual leave accrues at 1.25 days per month of continuous service. \
                    Unused days carry over up to a maximum of five.";
        let chunker = TextChunker::new(24, 6);
        let spans = chunker.split(text);

        assert!(spans.len() > 1);
        assert_eq!(reconstruct(&spans, 6), text);
    }

    #[test]
    fn reconstruction_holds_for_multibyte_text() {
        let text = "Délai de carence: quatorze jours — révision annuelle après évaluation.";
        let chunker = TextChunker::new(17, 5);
        let spans = chunker.split(text);

        assert!(spans.len() > 1);
        assert_eq!(reconstruct(&spans, 5), text);
    }

    #[test]
    fn short_text_yields_single_window() {
        let chunker = TextChunker::new(500, 50);
        let spans = chunker.split("Policy A states employees get 10 vacation days.");

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].char_start, 0);
        assert_eq!(spans[0].text, "Policy A states employees get 10 vacation days.");
    }

    #[test]
    fn empty_text_yields_no_windows() {
        let chunker = TextChunker::new(100, 10);
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn page_lookup_picks_containing_page() {
        let pages = vec![
            PageContent { page_number: 1, char_offset: 0 },
            PageContent { page_number: 2, char_offset: 40 },
            PageContent { page_number: 3, char_offset: 90 },
        ];

        assert_eq!(page_at(&pages, 0), 1);
        assert_eq!(page_at(&pages, 39), 1);
        assert_eq!(page_at(&pages, 40), 2);
        assert_eq!(page_at(&pages, 200), 3);
    }
}
