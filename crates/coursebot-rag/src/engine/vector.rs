//! Embedding similarity query engine

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use coursebot_core::{Embedder, Error, IndexKind, QueryEngine, Result, RetrievalResult};

use crate::engine::{AnswerSynthesizer, HydeTransform};
use crate::index::IndexHandle;

/// Retrieves the `top_k` most similar documents from a vector index,
/// optionally searching with a HyDE-transformed query.
pub struct VectorQueryEngine {
    name: String,
    index: Arc<IndexHandle>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    transform: Option<HydeTransform>,
    synthesizer: AnswerSynthesizer,
}

impl VectorQueryEngine {
    /// Fails with [`Error::InvalidKind`] unless `index` is a vector index
    pub fn new(
        name: impl Into<String>,
        index: Arc<IndexHandle>,
        embedder: Arc<dyn Embedder>,
        synthesizer: AnswerSynthesizer,
    ) -> Result<Self> {
        if index.kind() != IndexKind::Vector {
            return Err(Error::InvalidKind(format!(
                "vector query engine needs a vector index, got {}",
                index.kind()
            )));
        }

        Ok(Self {
            name: name.into(),
            index,
            embedder,
            top_k: 2,
            transform: None,
            synthesizer,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_transform(mut self, transform: HydeTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    async fn query_embedding(&self, question: &str) -> Result<Vec<f32>> {
        let strings = match &self.transform {
            Some(transform) => transform.embedding_strings(question).await?,
            None => vec![question.to_string()],
        };

        let embeddings = self.embedder.embed_batch(&strings)?;
        let mut mean = vec![0.0; self.embedder.dimension()];
        for embedding in &embeddings {
            for (acc, value) in mean.iter_mut().zip(embedding) {
                *acc += value;
            }
        }
        let count = embeddings.len().max(1) as f32;
        for value in mean.iter_mut() {
            *value /= count;
        }
        Ok(mean)
    }
}

#[async_trait]
impl QueryEngine for VectorQueryEngine {
    async fn query(&self, question: &str) -> Result<RetrievalResult> {
        let index = self
            .index
            .as_vector()
            .ok_or_else(|| Error::InvalidKind(self.index.kind().to_string()))?;

        let embedding = self.query_embedding(question).await?;
        let sources = index.search(&embedding, self.top_k)?;
        debug!(
            engine = %self.name,
            hyde = self.transform.is_some(),
            hits = sources.len(),
            "Vector search complete"
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
