//! Graph upsert operations.
//!
//! The importer normalizes incoming records into a flat list of [`GraphOp`]
//! values; the graph adapter executes them. Keeping the plan explicit makes
//! the importer a pure function over records, testable without a backend.

use serde_json::{Map, Value};

use crate::types::entity::{EntityKind, RelKind, RelType};

/// A node reference: label plus business id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub kind: EntityKind,
    pub id: String,
}

impl NodeRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

/// Endpoint-creation policy for an edge operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Merge both endpoints into existence before merging the edge.
    /// Edges under this policy can never dangle.
    MergeEndpoints,
    /// Match both endpoints; if either is missing, the edge is silently
    /// not created. No error is raised.
    RequireEndpoints,
}

/// One graph mutation.
///
/// All operations are idempotent: nodes merge on `(label, id)` with scalar
/// properties overwritten, edges merge on `(endpoints, type)`.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOp {
    /// Merge a node and overwrite the given scalar properties.
    MergeNode {
        kind: EntityKind,
        id: String,
        props: Map<String, Value>,
    },
    /// Create a schema edge. The endpoint policy comes from
    /// [`RelKind::policy`].
    Edge {
        from: NodeRef,
        rel: RelKind,
        to: NodeRef,
    },
    /// Create a generic link between two existing nodes of any label,
    /// using a pre-validated relationship type. Always strict-match.
    LinkAny {
        source_id: String,
        target_id: String,
        rel: RelType,
    },
}

/// Keep only property values a labeled-property graph can store: scalars
/// and homogeneous arrays of scalars. Nested objects (and arrays containing
/// them) are dropped.
pub fn scalar_props(raw: &Map<String, Value>) -> Map<String, Value> {
    raw.iter()
        .filter(|(_, v)| is_storable(v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn is_storable(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => true,
        Value::Array(items) => items.iter().all(|v| {
            matches!(v, Value::Bool(_) | Value::Number(_) | Value::String(_))
        }),
        Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_props_drops_nested_structures() {
        let raw = json!({
            "id": "R1",
            "title": "Brakes",
            "priority": 3,
            "reviewed": true,
            "tags": ["safety", "braking"],
            "src": {"docno": "D9"},
            "srd": [{"no": "S1"}],
        });
        let filtered = scalar_props(raw.as_object().unwrap());
        assert_eq!(filtered.len(), 5);
        assert!(filtered.contains_key("tags"));
        assert!(!filtered.contains_key("src"));
        assert!(!filtered.contains_key("srd"));
    }
}
