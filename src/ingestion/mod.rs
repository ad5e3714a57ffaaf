//! Document loading and chunking

pub mod chunker;
pub mod parser;

pub use chunker::TextChunker;
pub use parser::{DocumentLoader, PageContent, ParsedDocument};
