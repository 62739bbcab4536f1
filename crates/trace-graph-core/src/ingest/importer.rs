//! The entity importer.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ImportError, RecordKind, Result, TraceGraphError};
use crate::ingest::plan;
use crate::records::ImportBatch;
use crate::traits::GraphStore;
use crate::types::GraphOp;

/// Per-kind counts of records committed to the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub requirements: usize,
    pub test_cases: usize,
    pub test_runs: usize,
    pub links: usize,
}

/// Normalizes import batches into graph operations and applies them.
///
/// Each record is planned and applied individually; a failure aborts the
/// batch at that record, and everything applied before it stays committed.
/// There is no transaction spanning record kinds.
pub struct Importer {
    graph: Arc<dyn GraphStore>,
}

impl Importer {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    /// Import one batch, kind by kind in the fixed order: requirements,
    /// test cases, test runs, links.
    pub async fn import_batch(&self, batch: &ImportBatch) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        report.requirements = self
            .import_kind(RecordKind::Requirements, &batch.requirements, plan::plan_requirement)
            .await?;
        report.test_cases = self
            .import_kind(RecordKind::TestCases, &batch.test_cases, plan::plan_test_case)
            .await?;
        report.test_runs = self
            .import_kind(RecordKind::TestRuns, &batch.test_runs, plan::plan_test_run)
            .await?;
        report.links = self.import_links(batch).await?;

        info!(
            requirements = report.requirements,
            test_cases = report.test_cases,
            test_runs = report.test_runs,
            links = report.links,
            "imported batch into graph"
        );
        Ok(report)
    }

    async fn import_kind<R>(
        &self,
        kind: RecordKind,
        records: &[R],
        planner: impl Fn(&R) -> Result<Vec<GraphOp>>,
    ) -> Result<usize> {
        let mut imported = 0;
        for record in records {
            let ops = planner(record).map_err(|e| ImportError::new(kind, e))?;
            debug!(%kind, ops = ops.len(), "applying record operations");
            self.graph
                .apply(&ops)
                .await
                .map_err(|e| TraceGraphError::from(ImportError::new(kind, e)))?;
            imported += 1;
        }
        Ok(imported)
    }

    async fn import_links(&self, batch: &ImportBatch) -> Result<usize> {
        let mut imported = 0;
        for record in &batch.links {
            let op = plan::plan_link(record)
                .map_err(|e| ImportError::new(RecordKind::Links, e))?;
            let Some(op) = op else { continue };
            self.graph
                .apply(std::slice::from_ref(&op))
                .await
                .map_err(|e| TraceGraphError::from(ImportError::new(RecordKind::Links, e)))?;
            imported += 1;
        }
        Ok(imported)
    }
}
