//! Vector index synchronization.
//!
//! The index is a derived view: every sync re-scans the graph, re-embeds
//! every embeddable node in one batch, and upserts the full entry set.
//! Nothing is deleted: an entry whose node has left the graph goes stale
//! and degrades to an empty neighborhood at retrieval time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::traits::{EmbeddingProvider, GraphStore, VectorIndex};
use crate::types::VectorEntry;

/// Rebuilds the vector index from the graph's current content.
pub struct IndexSynchronizer {
    graph: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl IndexSynchronizer {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self { graph, embedder, index }
    }

    /// Scan, embed, and upsert all embeddable nodes.
    ///
    /// Returns the number of entries written; zero when the graph holds no
    /// Requirement/TestCase/TestRun nodes (nothing is touched in that
    /// case). The collection is created on first use with the
    /// dimensionality of the first returned vector.
    pub async fn sync_index(&self) -> Result<usize> {
        let rows = self.graph.scan_artifacts().await?;
        if rows.is_empty() {
            info!("no embeddable nodes in graph, skipping index sync");
            return Ok(0);
        }

        let texts: Vec<String> = rows.iter().map(|row| row.content()).collect();
        debug!(count = texts.len(), model = self.embedder.model_id(), "embedding artifacts");
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != rows.len() {
            return Err(ServiceError::invalid_response(
                "embedding",
                format!("expected {} vectors, got {}", rows.len(), vectors.len()),
            )
            .into());
        }

        let dimension = vectors[0].len();
        self.index.ensure_collection(dimension).await?;

        let entries: Vec<VectorEntry> = rows
            .iter()
            .zip(vectors)
            .zip(texts)
            .map(|((row, vector), text)| VectorEntry::new(row.key(), vector, text))
            .collect();
        let count = entries.len();
        self.index.upsert(entries).await?;

        info!(count, dimension, "synced vector index from graph");
        Ok(count)
    }
}
