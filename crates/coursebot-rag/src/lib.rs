//! Retrieval for coursebot
//!
//! This crate provides the list and vector indices, the registry that builds
//! and persists them per collection, the query engines bound to them, the
//! selectors and router that choose between engines, and the factory that
//! wires a course's engines together.

mod embedding;
mod engine;
mod factory;
mod index;
mod registry;
mod selector;
mod text;


pub use embedding::{cosine_similarity, HashEmbedder};
pub use engine::{
    AnswerSynthesizer, HydeTransform, ListQueryEngine, RouterQueryEngine, VectorQueryEngine,
};
pub use factory::{
    EngineName, EngineSettings, QueryEngineFactory, LECTURES_DESCRIPTION, SYLLABUS_DESCRIPTION,
};
pub use index::{IndexHandle, ListIndex, StoredIndex, VectorEntry, VectorIndex};
pub use registry::IndexRegistry;
pub use selector::{KeywordSelector, LlmSingleSelector};

// Re-export core types for convenience
pub use coursebot_core::{
    Document, DocumentMetadata, DocumentProvider, Embedder, EngineDescription, Error, IndexKind,
    LLMProvider, QueryEngine, Result, RetrievalResult, Selection, Selector, SourceSnippet,
};
