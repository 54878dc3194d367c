//! Single-choice selector trait used by the router

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A choice offered to a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescription {
    pub name: String,
    pub description: String,
    /// Terms from the engine's indexed content, for lexical selectors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl EngineDescription {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// The choice a selector made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// 0-based position in the choices slice
    pub index: usize,
    pub reason: String,
}

/// Picks exactly one of several engine descriptions for a question.
///
/// Returning `Ok(None)` means the selector could not decide. The caller is
/// responsible for validating `index` against the choices it passed in.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn select(
        &self,
        question: &str,
        choices: &[EngineDescription],
    ) -> Result<Option<Selection>>;
}
