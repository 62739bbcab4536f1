//! In-memory graph store with real merge and strict-match semantics.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::traits::GraphStore;
use crate::types::{
    ArtifactFields, ArtifactKind, ArtifactRow, EdgePolicy, EntityKind, GraphNeighborhood,
    GraphOp, NeighborhoodSeeds, RequirementNeighbors, TestCaseNeighbors, TestRunNeighbors,
};

type NodeKey = (EntityKind, String);

/// `(from_kind, from_id, rel, to_kind, to_id)`.
type EdgeKey = (EntityKind, String, String, EntityKind, String);

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeKey, Map<String, Value>>,
    edges: HashSet<EdgeKey>,
}

impl Inner {
    fn merge_node(&mut self, kind: EntityKind, id: &str, props: &Map<String, Value>) {
        let node = self.nodes.entry((kind, id.to_string())).or_default();
        for (k, v) in props {
            node.insert(k.clone(), v.clone());
        }
        node.entry("id".to_string()).or_insert_with(|| Value::String(id.to_string()));
    }

    fn has_node(&self, kind: EntityKind, id: &str) -> bool {
        self.nodes.contains_key(&(kind, id.to_string()))
    }

    /// All nodes carrying this business id, regardless of label.
    fn kinds_with_id(&self, id: &str) -> Vec<EntityKind> {
        self.nodes.keys().filter(|(_, nid)| nid == id).map(|(kind, _)| *kind).collect()
    }

    fn insert_edge(&mut self, from: (EntityKind, &str), rel: &str, to: (EntityKind, &str)) {
        self.edges.insert((
            from.0,
            from.1.to_string(),
            rel.to_string(),
            to.0,
            to.1.to_string(),
        ));
    }

    /// Target ids of `(from_kind, from_id) -rel-> (to_kind, *)`.
    fn targets(&self, from: (EntityKind, &str), rel: &str, to_kind: EntityKind) -> BTreeSet<String> {
        self.edges
            .iter()
            .filter(|(fk, fid, r, tk, _)| {
                *fk == from.0 && fid == from.1 && r == rel && *tk == to_kind
            })
            .map(|(_, _, _, _, tid)| tid.clone())
            .collect()
    }

    /// Source ids of `(from_kind, *) -rel-> (to_kind, to_id)`.
    fn sources(&self, from_kind: EntityKind, rel: &str, to: (EntityKind, &str)) -> BTreeSet<String> {
        self.edges
            .iter()
            .filter(|(fk, _, r, tk, tid)| {
                *fk == from_kind && r == rel && *tk == to.0 && tid == to.1
            })
            .map(|(_, fid, _, _, _)| fid.clone())
            .collect()
    }

    fn text_prop(&self, kind: EntityKind, id: &str, prop: &str) -> String {
        self.nodes
            .get(&(kind, id.to_string()))
            .and_then(|props| props.get(prop))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// In-memory implementation of [`GraphStore`].
///
/// Test only: everything lives under one lock and is lost on drop. The
/// semantics are the real ones (idempotent node/edge merges, per-edge-kind
/// endpoint policy, deduplicated neighborhood expansion), so importer and
/// engine tests run against honest behavior.
#[derive(Default)]
pub struct InMemoryGraphStore {
    inner: RwLock<Inner>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Test inspection helpers.

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.len()
    }

    pub fn node_props(&self, kind: EntityKind, id: &str) -> Option<Map<String, Value>> {
        self.inner.read().nodes.get(&(kind, id.to_string())).cloned()
    }

    pub fn has_edge(
        &self,
        from: (EntityKind, &str),
        rel: &str,
        to: (EntityKind, &str),
    ) -> bool {
        self.inner.read().edges.contains(&(
            from.0,
            from.1.to_string(),
            rel.to_string(),
            to.0,
            to.1.to_string(),
        ))
    }

    /// Every edge endpoint must reference an existing node.
    pub fn assert_no_dangling_edges(&self) {
        let inner = self.inner.read();
        for (fk, fid, rel, tk, tid) in &inner.edges {
            assert!(
                inner.has_node(*fk, fid),
                "edge {rel} dangles at source {fid}"
            );
            assert!(inner.has_node(*tk, tid), "edge {rel} dangles at target {tid}");
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ensure_constraints(&self) -> Result<()> {
        // Uniqueness is structural here: nodes are keyed by (label, id).
        Ok(())
    }

    async fn apply(&self, ops: &[GraphOp]) -> Result<()> {
        let mut inner = self.inner.write();
        for op in ops {
            match op {
                GraphOp::MergeNode { kind, id, props } => inner.merge_node(*kind, id, props),
                GraphOp::Edge { from, rel, to } => match rel.policy() {
                    EdgePolicy::MergeEndpoints => {
                        inner.merge_node(from.kind, &from.id, &Map::new());
                        inner.merge_node(to.kind, &to.id, &Map::new());
                        inner.insert_edge(
                            (from.kind, &from.id),
                            rel.as_str(),
                            (to.kind, &to.id),
                        );
                    }
                    EdgePolicy::RequireEndpoints => {
                        if inner.has_node(from.kind, &from.id) && inner.has_node(to.kind, &to.id)
                        {
                            inner.insert_edge(
                                (from.kind, &from.id),
                                rel.as_str(),
                                (to.kind, &to.id),
                            );
                        } else {
                            debug!(rel = rel.as_str(), from = %from.id, to = %to.id,
                                "skipping strict-match edge with missing endpoint");
                        }
                    }
                },
                GraphOp::LinkAny { source_id, target_id, rel } => {
                    let from_kinds = inner.kinds_with_id(source_id);
                    let to_kinds = inner.kinds_with_id(target_id);
                    if from_kinds.is_empty() || to_kinds.is_empty() {
                        debug!(rel = rel.as_str(), source = %source_id, target = %target_id,
                            "skipping generic link with unresolved endpoint");
                        continue;
                    }
                    for fk in &from_kinds {
                        for tk in &to_kinds {
                            inner.insert_edge(
                                (*fk, source_id),
                                rel.as_str(),
                                (*tk, target_id),
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn scan_artifacts(&self) -> Result<Vec<ArtifactRow>> {
        let inner = self.inner.read();
        let mut keys: Vec<NodeKey> = inner
            .nodes
            .keys()
            .filter(|(kind, _)| {
                matches!(
                    kind,
                    EntityKind::Requirement | EntityKind::TestCase | EntityKind::TestRun
                )
            })
            .cloned()
            .collect();
        keys.sort();

        let rows = keys
            .into_iter()
            .map(|(kind, id)| {
                let fields = match kind {
                    EntityKind::Requirement => ArtifactFields::Requirement {
                        title: inner.text_prop(kind, &id, "title"),
                        text: inner.text_prop(kind, &id, "text"),
                    },
                    EntityKind::TestCase => ArtifactFields::TestCase {
                        name: inner.text_prop(kind, &id, "name"),
                        description: inner.text_prop(kind, &id, "description"),
                    },
                    EntityKind::TestRun => ArtifactFields::TestRun {
                        status: inner.text_prop(kind, &id, "status"),
                        log: inner.text_prop(kind, &id, "log"),
                    },
                    _ => unreachable!("filtered to artifact kinds above"),
                };
                ArtifactRow { id, fields }
            })
            .collect();
        Ok(rows)
    }

    async fn expand(&self, seeds: &NeighborhoodSeeds) -> Result<GraphNeighborhood> {
        let inner = self.inner.read();
        let mut hood = GraphNeighborhood::default();

        if !seeds.bucket(ArtifactKind::Requirement).is_empty() {
            let mut entries = Vec::new();
            for id in seeds.bucket(ArtifactKind::Requirement) {
                if !inner.has_node(EntityKind::Requirement, id) {
                    continue;
                }
                let r = (EntityKind::Requirement, id.as_str());
                let test_cases =
                    inner.targets(r, "VERIFIED_BY", EntityKind::TestCase);
                // Test runs are reachable only through the verified cases.
                let test_runs: BTreeSet<String> = test_cases
                    .iter()
                    .flat_map(|tc| {
                        inner.targets(
                            (EntityKind::TestCase, tc.as_str()),
                            "EXECUTED_IN",
                            EntityKind::TestRun,
                        )
                    })
                    .collect();
                let mut req_docs =
                    inner.sources(EntityKind::ReqDoc, "CONTAINS", r);
                req_docs.extend(inner.targets(r, "BELONGS_TO_DOC", EntityKind::ReqDoc));

                entries.push(RequirementNeighbors {
                    req_id: id.clone(),
                    test_cases: test_cases.into_iter().collect(),
                    test_runs: test_runs.into_iter().collect(),
                    customers: inner
                        .sources(EntityKind::Customer, "USES_REQUIREMENT", r)
                        .into_iter()
                        .collect(),
                    customer_reqs: inner
                        .sources(EntityKind::CustomerRequirement, "RELATED_TO", r)
                        .into_iter()
                        .collect(),
                    req_docs: req_docs.into_iter().collect(),
                });
            }
            hood.requirements = Some(entries);
        }

        if !seeds.bucket(ArtifactKind::TestCase).is_empty() {
            let mut entries = Vec::new();
            for id in seeds.bucket(ArtifactKind::TestCase) {
                if !inner.has_node(EntityKind::TestCase, id) {
                    continue;
                }
                let tc = (EntityKind::TestCase, id.as_str());
                entries.push(TestCaseNeighbors {
                    tc_id: id.clone(),
                    requirements: inner
                        .sources(EntityKind::Requirement, "VERIFIED_BY", tc)
                        .into_iter()
                        .collect(),
                    test_runs: inner
                        .targets(tc, "EXECUTED_IN", EntityKind::TestRun)
                        .into_iter()
                        .collect(),
                });
            }
            hood.test_cases = Some(entries);
        }

        if !seeds.bucket(ArtifactKind::TestRun).is_empty() {
            let mut entries = Vec::new();
            for id in seeds.bucket(ArtifactKind::TestRun) {
                if !inner.has_node(EntityKind::TestRun, id) {
                    continue;
                }
                let tr = (EntityKind::TestRun, id.as_str());
                let test_cases = inner.sources(EntityKind::TestCase, "EXECUTED_IN", tr);
                let requirements: BTreeSet<String> = test_cases
                    .iter()
                    .flat_map(|tc| {
                        inner.sources(
                            EntityKind::Requirement,
                            "VERIFIED_BY",
                            (EntityKind::TestCase, tc.as_str()),
                        )
                    })
                    .collect();
                entries.push(TestRunNeighbors {
                    tr_id: id.clone(),
                    test_cases: test_cases.into_iter().collect(),
                    requirements: requirements.into_iter().collect(),
                });
            }
            hood.test_runs = Some(entries);
        }

        Ok(hood)
    }
}
