//! In-memory vector index with linear-scan cosine search.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{IndexError, Result};
use crate::traits::VectorIndex;
use crate::types::{VectorEntry, VectorHit};

#[derive(Default)]
struct Inner {
    dimension: Option<usize>,
    /// Insertion-ordered; replacing an entry keeps its original position,
    /// which is what makes tie-breaking deterministic.
    entries: Vec<VectorEntry>,
}

/// In-memory implementation of [`VectorIndex`].
///
/// Test only: O(n) search, no persistence. Upsert replaces by key in
/// place; search sorts by cosine similarity with a stable sort, so equal
/// scores keep insertion order.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    inner: RwLock<Inner>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn entry_keys(&self) -> Vec<String> {
        self.inner.read().entries.iter().map(|e| e.key.to_string()).collect()
    }

    /// Stored text for a composite key, if present.
    pub fn text_of(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .entries
            .iter()
            .find(|e| e.key.to_string() == key)
            .map(|e| e.text.clone())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.dimension.is_none() {
            inner.dimension = Some(dimension);
        }
        // Existing collection: no-op regardless of the requested dimension;
        // a conflict surfaces at upsert.
        Ok(())
    }

    async fn upsert(&self, entries: Vec<VectorEntry>) -> Result<()> {
        let mut inner = self.inner.write();
        let expected = match inner.dimension {
            Some(d) => d,
            None => {
                return Err(IndexError::Backend(
                    "collection does not exist; call ensure_collection first".into(),
                )
                .into())
            }
        };

        for entry in entries {
            if entry.vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: entry.vector.len(),
                }
                .into());
            }
            match inner.entries.iter_mut().find(|e| e.key == entry.key) {
                Some(existing) => *existing = entry,
                None => inner.entries.push(entry),
            }
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let inner = self.inner.read();
        let mut scored: Vec<VectorHit> = inner
            .entries
            .iter()
            .map(|e| VectorHit {
                key: e.key.clone(),
                score: cosine(vector, &e.vector),
                text: e.text.clone(),
            })
            .collect();
        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}
