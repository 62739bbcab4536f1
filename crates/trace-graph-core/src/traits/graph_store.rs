//! Graph backend trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ArtifactRow, GraphNeighborhood, GraphOp, NeighborhoodSeeds};

/// Storage boundary for the labeled-property graph.
///
/// Implementations execute parameterized queries against an external graph
/// backend; correctness under concurrent callers is the backend's concern.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Idempotently establish the per-entity uniqueness constraints
    /// (one per label, keyed by `id`). Called once at startup.
    async fn ensure_constraints(&self) -> Result<()>;

    /// Execute a sequence of graph operations in order.
    ///
    /// Node merges are idempotent on `(label, id)`; edge merges on
    /// `(endpoints, type)`. Strict-match edges whose endpoints are missing
    /// are skipped silently per [`EdgePolicy`](crate::types::EdgePolicy).
    async fn apply(&self, ops: &[GraphOp]) -> Result<()>;

    /// Scan all embeddable nodes (Requirement, TestCase, TestRun) with the
    /// text fields the sync pipeline derives content from. Missing
    /// properties come back as empty strings. Order is deterministic for a
    /// given graph state.
    async fn scan_artifacts(&self) -> Result<Vec<ArtifactRow>>;

    /// Expand the seed ids into their typed neighborhoods.
    ///
    /// One fixed-shape query per non-empty bucket; empty buckets are not
    /// queried and stay `None` in the result. Every returned entry
    /// corresponds to a seed id that exists in the graph; ids that do not
    /// resolve simply produce no entry.
    async fn expand(&self, seeds: &NeighborhoodSeeds) -> Result<GraphNeighborhood>;
}
