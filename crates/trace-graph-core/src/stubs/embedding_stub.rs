//! Deterministic test embeddings.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::EmbeddingProvider;

/// Bag-of-tokens hash embedding.
///
/// Each lowercased alphanumeric token is hashed into one of `dimension`
/// buckets and the vector is L2-normalized, so texts sharing words are
/// cosine-similar and disjoint texts are (near-)orthogonal. Deterministic
/// across runs; good enough to rank obviously-related texts first in
/// tests, nothing more.
#[derive(Debug, Clone)]
pub struct StubEmbeddingProvider {
    dimension: usize,
}

impl StubEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimension: 16 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
        {
            let bucket = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a, 64-bit. Stable across platforms and runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_id(&self) -> &str {
        "stub-hash-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_and_ordered() {
        let provider = StubEmbeddingProvider::new();
        let texts = vec!["brakes must stop".to_string(), "login screen".to_string()];
        let first = provider.embed_batch(&texts).await.unwrap();
        let second = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].len(), 16);
    }

    #[tokio::test]
    async fn shared_tokens_score_higher_than_disjoint_ones() {
        let provider = StubEmbeddingProvider::new();
        let query = provider.embed("brakes").await.unwrap();
        let related = provider.embed("Brakes\nmust stop").await.unwrap();
        let unrelated = provider.embed("login screen renders").await.unwrap();
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }
}
