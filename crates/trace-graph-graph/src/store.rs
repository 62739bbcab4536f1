//! The Neo4j store.

use async_trait::async_trait;
use neo4rs::{query, Graph, Query};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use trace_graph_core::config::Neo4jConfig;
use trace_graph_core::error::{GraphError, Result};
use trace_graph_core::traits::GraphStore;
use trace_graph_core::types::{
    ArtifactFields, ArtifactRow, ArtifactKind, EdgePolicy, GraphNeighborhood, GraphOp,
    NeighborhoodSeeds, RequirementNeighbors, TestCaseNeighbors, TestRunNeighbors,
};

use crate::queries;

/// [`GraphStore`] implementation over a bolt connection pool.
///
/// Constructed once at startup and shared; concurrency control is the
/// backend's. Every write is committed per statement; there is no
/// transaction spanning an import batch.
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    /// Connect to the configured Neo4j instance.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let graph = Graph::new(config.uri.as_str(), config.user.as_str(), config.password.as_str())
            .await
            .map_err(|e| GraphError::Connect(e.to_string()))?;
        info!(uri = %config.uri, "connected to graph backend");
        Ok(Self { graph })
    }

    async fn run(&self, q: Query) -> Result<()> {
        self.graph.run(q).await.map_err(|e| GraphError::Backend(e.to_string()).into())
    }

    async fn apply_one(&self, op: &GraphOp) -> Result<()> {
        match op {
            GraphOp::MergeNode { kind, id, props } => {
                let (keys, q) = build_merge_node(*kind, id, props);
                debug!(label = kind.label(), id = %id, props = keys, "merging node");
                self.run(q).await
            }
            GraphOp::Edge { from, rel, to } => {
                let text = match rel.policy() {
                    EdgePolicy::MergeEndpoints => queries::merge_edge(from, *rel, to),
                    EdgePolicy::RequireEndpoints => queries::match_edge(from, *rel, to),
                };
                let q = query(&text)
                    .param("from_id", from.id.as_str())
                    .param("to_id", to.id.as_str());
                self.run(q).await
            }
            GraphOp::LinkAny { source_id, target_id, rel } => {
                let q = query(&queries::link_any(rel))
                    .param("source", source_id.as_str())
                    .param("target", target_id.as_str());
                self.run(q).await
            }
        }
    }
}

/// Build the node-merge query: validated keys spliced, values as
/// positional parameters. Keys failing the identifier check and null
/// values are dropped with a warning.
fn build_merge_node(
    kind: trace_graph_core::types::EntityKind,
    id: &str,
    props: &Map<String, Value>,
) -> (usize, Query) {
    let mut keys: Vec<&str> = Vec::with_capacity(props.len());
    let mut values: Vec<&Value> = Vec::with_capacity(props.len());
    for (key, value) in props {
        if key == "id" || value.is_null() {
            continue;
        }
        if !queries::is_property_key(key) {
            warn!(label = kind.label(), id = %id, key = %key, "dropping non-identifier property key");
            continue;
        }
        keys.push(key);
        values.push(value);
    }

    let mut q = query(&queries::merge_node(kind, &keys)).param("id", id);
    for (i, value) in values.iter().enumerate() {
        q = apply_param(q, &format!("p{i}"), value);
    }
    (keys.len(), q)
}

/// Attach one scalar (or scalar-array) JSON value as a bolt parameter.
fn apply_param(q: Query, name: &str, value: &Value) -> Query {
    match value {
        Value::String(s) => q.param(name, s.as_str()),
        Value::Bool(b) => q.param(name, *b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => q.param(name, i),
            None => q.param(name, n.as_f64().unwrap_or(0.0)),
        },
        Value::Array(items) => {
            if items.iter().all(Value::is_string) {
                let list: Vec<String> =
                    items.iter().filter_map(|v| v.as_str().map(String::from)).collect();
                q.param(name, list)
            } else if items.iter().all(Value::is_boolean) {
                let list: Vec<bool> = items.iter().filter_map(Value::as_bool).collect();
                q.param(name, list)
            } else if items.iter().all(Value::is_number) {
                let list: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
                q.param(name, list)
            } else {
                // Mixed arrays are already filtered out by the planner.
                q.param(name, Vec::<String>::new())
            }
        }
        // Nulls and objects never reach here.
        _ => q,
    }
}

/// Deduplicate while preserving first-seen order, dropping empty ids.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| !id.is_empty() && seen.insert(id.clone())).collect()
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn ensure_constraints(&self) -> Result<()> {
        for statement in queries::constraint_statements() {
            debug!(%statement, "applying constraint");
            self.run(query(&statement)).await?;
        }
        info!("graph uniqueness constraints in place");
        Ok(())
    }

    async fn apply(&self, ops: &[GraphOp]) -> Result<()> {
        for op in ops {
            self.apply_one(op).await?;
        }
        Ok(())
    }

    async fn scan_artifacts(&self) -> Result<Vec<ArtifactRow>> {
        let mut rows = Vec::new();

        let mut stream = self
            .graph
            .execute(query(queries::SCAN_REQUIREMENTS))
            .await
            .map_err(|e| GraphError::Backend(e.to_string()))?;
        while let Some(row) = stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))? {
            let id: String = row.get("id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            rows.push(ArtifactRow {
                id,
                fields: ArtifactFields::Requirement {
                    title: row.get("title").unwrap_or_default(),
                    text: row.get("text").unwrap_or_default(),
                },
            });
        }

        let mut stream = self
            .graph
            .execute(query(queries::SCAN_TEST_CASES))
            .await
            .map_err(|e| GraphError::Backend(e.to_string()))?;
        while let Some(row) = stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))? {
            let id: String = row.get("id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            rows.push(ArtifactRow {
                id,
                fields: ArtifactFields::TestCase {
                    name: row.get("name").unwrap_or_default(),
                    description: row.get("description").unwrap_or_default(),
                },
            });
        }

        let mut stream = self
            .graph
            .execute(query(queries::SCAN_TEST_RUNS))
            .await
            .map_err(|e| GraphError::Backend(e.to_string()))?;
        while let Some(row) = stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))? {
            let id: String = row.get("id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            rows.push(ArtifactRow {
                id,
                fields: ArtifactFields::TestRun {
                    status: row.get("status").unwrap_or_default(),
                    log: row.get("log").unwrap_or_default(),
                },
            });
        }

        debug!(count = rows.len(), "scanned embeddable artifacts");
        Ok(rows)
    }

    async fn expand(&self, seeds: &NeighborhoodSeeds) -> Result<GraphNeighborhood> {
        let mut hood = GraphNeighborhood::default();

        let req_ids = seeds.bucket(ArtifactKind::Requirement);
        if !req_ids.is_empty() {
            let q = query(queries::EXPAND_REQUIREMENTS).param("ids", req_ids.to_vec());
            let mut stream = self
                .graph
                .execute(q)
                .await
                .map_err(|e| GraphError::Backend(e.to_string()))?;
            let mut entries = Vec::new();
            while let Some(row) =
                stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))?
            {
                entries.push(RequirementNeighbors {
                    req_id: row.get("reqId").unwrap_or_default(),
                    test_cases: dedup_ids(row.get("testCases").unwrap_or_default()),
                    test_runs: dedup_ids(row.get("testRuns").unwrap_or_default()),
                    customers: dedup_ids(row.get("customers").unwrap_or_default()),
                    customer_reqs: dedup_ids(row.get("customerReqs").unwrap_or_default()),
                    req_docs: dedup_ids(row.get("reqDocs").unwrap_or_default()),
                });
            }
            hood.requirements = Some(entries);
        }

        let tc_ids = seeds.bucket(ArtifactKind::TestCase);
        if !tc_ids.is_empty() {
            let q = query(queries::EXPAND_TEST_CASES).param("ids", tc_ids.to_vec());
            let mut stream = self
                .graph
                .execute(q)
                .await
                .map_err(|e| GraphError::Backend(e.to_string()))?;
            let mut entries = Vec::new();
            while let Some(row) =
                stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))?
            {
                entries.push(TestCaseNeighbors {
                    tc_id: row.get("tcId").unwrap_or_default(),
                    requirements: dedup_ids(row.get("requirements").unwrap_or_default()),
                    test_runs: dedup_ids(row.get("testRuns").unwrap_or_default()),
                });
            }
            hood.test_cases = Some(entries);
        }

        let tr_ids = seeds.bucket(ArtifactKind::TestRun);
        if !tr_ids.is_empty() {
            let q = query(queries::EXPAND_TEST_RUNS).param("ids", tr_ids.to_vec());
            let mut stream = self
                .graph
                .execute(q)
                .await
                .map_err(|e| GraphError::Backend(e.to_string()))?;
            let mut entries = Vec::new();
            while let Some(row) =
                stream.next().await.map_err(|e| GraphError::Backend(e.to_string()))?
            {
                entries.push(TestRunNeighbors {
                    tr_id: row.get("trId").unwrap_or_default(),
                    test_cases: dedup_ids(row.get("testCases").unwrap_or_default()),
                    requirements: dedup_ids(row.get("requirements").unwrap_or_default()),
                });
            }
            hood.test_runs = Some(entries);
        }

        Ok(hood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trace_graph_core::types::EntityKind;

    #[test]
    fn merge_node_skips_id_nulls_and_bad_keys() {
        let props = json!({
            "id": "R1",
            "title": "Brakes",
            "empty": null,
            "weird key": "dropped",
            "priority": 3,
        });
        let (count, _q) = build_merge_node(
            EntityKind::Requirement,
            "R1",
            props.as_object().unwrap(),
        );
        // Only title and priority survive.
        assert_eq!(count, 2);
    }

    #[test]
    fn dedup_ids_preserves_first_seen_order() {
        let ids = vec![
            "D1".to_string(),
            "D2".to_string(),
            "D1".to_string(),
            String::new(),
        ];
        assert_eq!(dedup_ids(ids), vec!["D1", "D2"]);
    }
}
