//! List and vector indices

mod storage;

use serde::{Deserialize, Serialize};

use coursebot_core::{Document, Embedder, Error, IndexKind, Result, SourceSnippet};

use crate::embedding::cosine_similarity;

pub use storage::StoredIndex;
pub(crate) use storage::{load, persist, INDEX_FILE};

/// A built index of one of the supported kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndexHandle {
    List(ListIndex),
    Vector(VectorIndex),
}

impl IndexHandle {
    /// Build an index of `kind` over `documents`
    pub fn build(kind: IndexKind, documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self> {
        match kind {
            IndexKind::List => Ok(IndexHandle::List(ListIndex::new(documents))),
            IndexKind::Vector => Ok(IndexHandle::Vector(VectorIndex::build(documents, embedder)?)),
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            IndexHandle::List(_) => IndexKind::List,
            IndexHandle::Vector(_) => IndexKind::Vector,
        }
    }

    /// Every document in the index, in ingestion order
    pub fn documents(&self) -> Vec<&Document> {
        match self {
            IndexHandle::List(index) => index.documents.iter().collect(),
            IndexHandle::Vector(index) => index.entries.iter().map(|e| &e.document).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexHandle::List(index) => index.documents.len(),
            IndexHandle::Vector(index) => index.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_vector(&self) -> Option<&VectorIndex> {
        match self {
            IndexHandle::Vector(index) => Some(index),
            IndexHandle::List(_) => None,
        }
    }
}

/// Unranked collection: every document is a retrieval candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListIndex {
    documents: Vec<Document>,
}

impl ListIndex {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

/// A document with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Embedding similarity index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<VectorEntry>,
}

impl VectorIndex {
    pub fn build(documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| VectorEntry { document, embedding })
            .collect();

        Ok(Self {
            dimension: embedder.dimension(),
            entries,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }

    /// The `top_k` most similar documents, most similar first
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SourceSnippet>> {
        if query_embedding.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query_embedding, &entry.embedding), &entry.document))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, document)| document.to_snippet(score))
            .collect())
    }
}
