//! HyDE query transform

use std::sync::Arc;
use tracing::debug;

use coursebot_core::{LLMProvider, Result};

/// Hypothetical Document Embeddings.
///
/// Asks the LLM to write a passage answering the question and searches with
/// that passage alongside the original question, which tends to land closer
/// to lecture-slide wording than the bare question does.
#[derive(Clone)]
pub struct HydeTransform {
    llm: Arc<dyn LLMProvider>,
    include_original: bool,
}

impl HydeTransform {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            llm,
            include_original: true,
        }
    }

    pub fn without_original(mut self) -> Self {
        self.include_original = false;
        self
    }

    /// Texts whose embeddings are averaged into the query embedding
    pub async fn embedding_strings(&self, question: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Please write a passage to answer the question.\n\
            Try to include as many key details as possible.\n\
            \n\
            {}\n\
            \n\
            Passage:",
            question
        );
        let passage = self.llm.generate(&prompt).await?.text;
        debug!(chars = passage.len(), "Generated hypothetical document");

        let mut strings = vec![passage];
        if self.include_original {
            strings.push(question.to_string());
        }
        Ok(strings)
    }
}
