//! Full-scan query engine with keyword rerank

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use coursebot_core::{QueryEngine, Result, RetrievalResult, SourceSnippet};

use crate::engine::AnswerSynthesizer;
use crate::index::IndexHandle;
use crate::text::{keyword_score, term_set};

/// Scores every document in the index against the question and keeps the
/// `top_n` best before synthesizing an answer.
pub struct ListQueryEngine {
    name: String,
    index: Arc<IndexHandle>,
    top_n: usize,
    synthesizer: AnswerSynthesizer,
}

impl ListQueryEngine {
    pub fn new(name: impl Into<String>, index: Arc<IndexHandle>, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            name: name.into(),
            index,
            top_n: 2,
            synthesizer,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    /// Rank every candidate, most relevant first; ties keep ingestion order
    pub fn rerank(&self, question: &str) -> Vec<SourceSnippet> {
        let terms = term_set(question);
        let mut scored: Vec<SourceSnippet> = self
            .index
            .documents()
            .into_iter()
            .map(|document| document.to_snippet(keyword_score(&terms, &document.text)))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.top_n);
        scored
    }
}

#[async_trait]
impl QueryEngine for ListQueryEngine {
    async fn query(&self, question: &str) -> Result<RetrievalResult> {
        let sources = self.rerank(question);
        debug!(
            engine = %self.name,
            candidates = self.index.len(),
            kept = sources.len(),
            "Reranked list index"
        );

        let answer = self.synthesizer.synthesize(question, &sources).await?;
        Ok(RetrievalResult {
            answer,
            sources,
            engine: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
