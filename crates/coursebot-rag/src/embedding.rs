//! Local hashing embedder

use std::collections::BTreeMap;

use coursebot_core::{Embedder, Result};

use crate::text::tokenize;

/// Feature-hashing embedder.
///
/// Every term and adjacent term pair is hashed with md5 into a few buckets of
/// a fixed-size vector, weighted by a sublinear term frequency, and the result
/// is L2-normalised. md5 keeps the buckets identical across builds and
/// platforms, which persisted vector indices rely on.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new() -> Self {
        Self::with_dimension(Self::DEFAULT_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket_hash(feature: &str) -> u64 {
        let digest = md5::compute(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.0[..8]);
        u64::from_le_bytes(bytes)
    }

    fn add_feature(&self, embedding: &mut [f32], feature: &str, weight: f32) {
        let hash = Self::bucket_hash(feature);
        let dim = self.dimension as u64;

        let idx1 = (hash % dim) as usize;
        let idx2 = ((hash >> 16) % dim) as usize;
        let idx3 = ((hash >> 32) % dim) as usize;

        embedding[idx1] += weight;
        embedding[idx2] += weight * 0.7;
        embedding[idx3] += weight * 0.5;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let words = tokenize(text);
        let mut embedding = vec![0.0; self.dimension];

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for word in &words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
        for (word, count) in counts {
            self.add_feature(&mut embedding, word, 1.0 + (count as f32).ln());
        }

        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut embedding, &bigram, 0.5);
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        Ok(embedding)
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
