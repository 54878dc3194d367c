//! Documents, snippets and retrieval results

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Provenance of a document or snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    /// 1-based page number within the source file
    pub page_label: u32,
    /// Directory the source file lives in
    pub path: String,
}

impl DocumentMetadata {
    pub fn new(file_name: impl Into<String>, page_label: u32, path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            page_label,
            path: path.into(),
        }
    }

    /// Full path of the source file
    pub fn source_file(&self) -> PathBuf {
        PathBuf::from(&self.path).join(&self.file_name)
    }
}

/// An ingested unit of content, one per source page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with an id derived from its provenance and text
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        let text = text.into();
        let id = format!(
            "{:x}",
            md5::compute(format!("{}:{}:{}", metadata.file_name, metadata.page_label, text))
        );
        Self { id, text, metadata }
    }

    /// Turn this document into a scored snippet
    pub fn to_snippet(&self, score: f32) -> SourceSnippet {
        SourceSnippet {
            text: self.text.clone(),
            score,
            metadata: self.metadata.clone(),
        }
    }
}

/// A retrieved excerpt with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnippet {
    pub text: String,
    /// Higher is more relevant
    pub score: f32,
    pub metadata: DocumentMetadata,
}

/// Answer text plus supporting snippets, most relevant first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub answer: String,
    pub sources: Vec<SourceSnippet>,
    /// Name of the engine that produced the answer
    pub engine: String,
}

impl RetrievalResult {
    pub fn top_source(&self) -> Option<&SourceSnippet> {
        self.sources.first()
    }
}
