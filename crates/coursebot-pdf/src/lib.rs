//! PDF handling for coursebot
//!
//! Slicing a single page out of a source PDF, reading a directory of PDFs into
//! per-page documents, and rendering retrieved snippets as citations with an
//! embeddable page preview.

mod citation;
mod page;
mod reader;

#[cfg(test)]
mod tests;

pub use citation::{html_report, CitationMetadata, CitationRenderer, CitationView};
pub use page::{extract_page, page_count, page_text, write_text_pdf};
pub use reader::PdfDirectoryReader;

// Re-export core types for convenience
pub use coursebot_core::{Document, DocumentMetadata, Error, Result, RetrievalResult, SourceSnippet};
