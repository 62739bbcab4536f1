//! Entity import: record normalization, graph upserts, and the coupled
//! index re-sync.

pub mod importer;
pub mod plan;

pub use importer::{ImportReport, Importer};

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::records::ImportBatch;
use crate::sync::IndexSynchronizer;

/// Result of one full import call: what reached the graph, and how many
/// vectors the follow-up sync indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub report: ImportReport,
    pub synced_vectors: usize,
}

/// Import followed by a synchronous full index re-sync.
///
/// The coupling is deliberate: retrieval never serves data from before the
/// last import, at the cost of re-embedding the whole corpus each time.
pub struct ImportPipeline {
    importer: Importer,
    sync: Arc<IndexSynchronizer>,
}

impl ImportPipeline {
    pub fn new(importer: Importer, sync: Arc<IndexSynchronizer>) -> Self {
        Self { importer, sync }
    }

    /// Import a batch, then rebuild the vector index from the graph.
    ///
    /// Import is not atomic across record kinds; on failure the error names
    /// the kind that failed and earlier kinds stay committed (and indexed
    /// only by the next successful sync).
    pub async fn run(&self, batch: &ImportBatch) -> Result<ImportOutcome> {
        let report = self.importer.import_batch(batch).await?;
        let synced_vectors = self.sync.sync_index().await?;
        info!(
            requirements = report.requirements,
            test_cases = report.test_cases,
            test_runs = report.test_runs,
            links = report.links,
            synced_vectors,
            "import batch complete"
        );
        Ok(ImportOutcome { report, synced_vectors })
    }
}
