//! Core traits and types for coursebot
//!
//! This crate defines the data model shared by the ingestion, indexing and
//! query crates, together with the capability traits that the rest of the
//! workspace is wired through: LLM providers, embedders, document providers,
//! query engines and selectors.

pub mod config;
pub mod document;
pub mod embedder;
pub mod error;
pub mod index;
pub mod llm;
pub mod provider;
pub mod query_engine;
pub mod selector;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use document::{Document, DocumentMetadata, RetrievalResult, SourceSnippet};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use index::IndexKind;
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use provider::DocumentProvider;
pub use query_engine::QueryEngine;
pub use selector::{EngineDescription, Selection, Selector};
