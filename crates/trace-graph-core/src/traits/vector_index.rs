//! Vector index trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{VectorEntry, VectorHit};

/// Storage boundary for the derived vector index.
///
/// The index is a rebuildable view of the graph: every sync re-derives all
/// entries, and the engine tolerates hits whose node has since left the
/// graph.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotently create the backing collection with the given
    /// dimensionality and cosine similarity. No-op when the collection
    /// exists; a dimensionality conflict with an existing collection
    /// surfaces at upsert time, not here.
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Upsert entries, replacing any existing entry with the same key.
    ///
    /// # Errors
    ///
    /// [`IndexError::DimensionMismatch`](crate::error::IndexError) when an
    /// entry's vector length differs from the collection dimension.
    async fn upsert(&self, entries: Vec<VectorEntry>) -> Result<()>;

    /// Top-`limit` nearest entries by cosine similarity, descending score.
    /// Ties resolve in insertion order; the ranking is deterministic for a
    /// fixed index state.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorHit>>;
}
