//! Embedding backend trait

use crate::Result;

/// Turns text into fixed-size vectors for similarity search.
///
/// Implementations must be deterministic: the vector index persists the
/// embeddings computed at build time and compares them against query
/// embeddings computed later, possibly in another process.
pub trait Embedder: Send + Sync {
    /// Length of every vector returned by [`Embedder::embed`]
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
