//! The hybrid retrieval engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::retrieval::grouping::group_hits;
use crate::traits::{EmbeddingProvider, GraphStore, VectorIndex};
use crate::types::{GraphNeighborhood, VectorMatch};

/// Default number of nearest neighbors per query.
pub const DEFAULT_TOP_K: usize = 5;

/// The merged retrieval result: ranked vector hits plus the graph
/// neighborhood around them, deliberately uncombined. Display and prompt
/// construction decide how to weave them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridContext {
    pub vector_matches: Vec<VectorMatch>,
    pub graph_neighbourhood: GraphNeighborhood,
}

/// Orchestrates embed → similarity search → grouping → graph expansion.
///
/// Holds no state beyond its collaborators; independent queries run
/// concurrently. Backend and service failures propagate uncaught; there
/// is no silent empty-result fallback.
pub struct HybridEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    graph: Arc<dyn GraphStore>,
    top_k: usize,
}

impl HybridEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        graph: Arc<dyn GraphStore>,
    ) -> Self {
        Self { embedder, index, graph, top_k: DEFAULT_TOP_K }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Plain vector search: ranked matches with their stored text.
    pub async fn vector_search(&self, query: &str) -> Result<Vec<VectorMatch>> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, self.top_k).await?;
        debug!(query, hits = hits.len(), "vector search complete");
        Ok(hits.iter().map(VectorMatch::with_text).collect())
    }

    /// Hybrid retrieval.
    ///
    /// 1. Embed the query (a one-element batch).
    /// 2. Top-K similarity search.
    /// 3. Group hit ids by payload type, deduplicated, first-seen order.
    /// 4. Expand the non-empty buckets into their neighborhoods.
    ///
    /// Every id inside the neighborhood's bucket for a type was seeded from
    /// that type's bucket in step 3. A hit whose node no longer exists in
    /// the graph contributes no neighborhood entry: stale index entries
    /// degrade, they do not fail the query.
    pub async fn retrieve(&self, query: &str) -> Result<HybridContext> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, self.top_k).await?;

        let seeds = group_hits(&hits);
        let graph_neighbourhood = if seeds.is_empty() {
            GraphNeighborhood::default()
        } else {
            self.graph.expand(&seeds).await?
        };
        debug!(query, hits = hits.len(), seeds = seeds.len(), "hybrid retrieval complete");

        Ok(HybridContext {
            vector_matches: hits.iter().map(VectorMatch::ranked_only).collect(),
            graph_neighbourhood,
        })
    }
}
