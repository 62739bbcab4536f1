//! Cypher text builders.
//!
//! Pure string construction, unit-tested without a backend. Only three
//! things are ever spliced into query text: entity labels (enum-derived),
//! relationship types (enum-derived or validated [`RelType`]), and
//! property keys that passed [`is_property_key`] (backtick-quoted on top).
//! Everything else is a bolt parameter.

use trace_graph_core::types::{EntityKind, NodeRef, RelKind, RelType};

/// Uniqueness constraint statements, one per entity label.
pub fn constraint_statements() -> Vec<String> {
    EntityKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "CREATE CONSTRAINT {name} IF NOT EXISTS FOR (n:{label}) REQUIRE n.id IS UNIQUE",
                name = constraint_name(*kind),
                label = kind.label(),
            )
        })
        .collect()
}

fn constraint_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Requirement => "requirement_id",
        EntityKind::ReqDoc => "doc_id",
        EntityKind::TestCase => "testcase_id",
        EntityKind::TestRun => "testrun_id",
        EntityKind::Customer => "customer_id",
        EntityKind::CustomerRequirement => "custreq_id",
        EntityKind::Srd => "srd_id",
    }
}

/// Whether a property key may be spliced (backtick-quoted) into a SET
/// clause. Conservative identifier syntax; anything else is dropped by the
/// caller rather than quoted around.
pub fn is_property_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && key.chars().next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false)
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `MERGE (n:Label {id: $id}) SET n.`k` = $p0, ...` for the given keys.
///
/// `keys` must already be filtered through [`is_property_key`]; parameter
/// names are positional (`p0`, `p1`, ...) in key order.
pub fn merge_node(kind: EntityKind, keys: &[&str]) -> String {
    let mut text = format!("MERGE (n:{} {{id: $id}})", kind.label());
    if !keys.is_empty() {
        let assignments: Vec<String> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| format!("n.`{key}` = $p{i}"))
            .collect();
        text.push_str("\nSET ");
        text.push_str(&assignments.join(", "));
    }
    text
}

/// Merge-create edge: both endpoints merged into existence first.
pub fn merge_edge(from: &NodeRef, rel: RelKind, to: &NodeRef) -> String {
    format!(
        "MERGE (a:{from_label} {{id: $from_id}})\n\
         MERGE (b:{to_label} {{id: $to_id}})\n\
         MERGE (a)-[:{rel}]->(b)",
        from_label = from.kind.label(),
        to_label = to.kind.label(),
        rel = rel.as_str(),
    )
}

/// Strict-match edge: no endpoint is created; if either MATCH comes up
/// empty the statement merges nothing and that is the intended outcome.
pub fn match_edge(from: &NodeRef, rel: RelKind, to: &NodeRef) -> String {
    format!(
        "MATCH (a:{from_label} {{id: $from_id}})\n\
         MATCH (b:{to_label} {{id: $to_id}})\n\
         MERGE (a)-[:{rel}]->(b)",
        from_label = from.kind.label(),
        to_label = to.kind.label(),
        rel = rel.as_str(),
    )
}

/// Generic link between nodes of any label. The relationship type went
/// through [`RelType::parse`]; raw caller strings never reach this point.
pub fn link_any(rel: &RelType) -> String {
    format!(
        "MATCH (src {{id: $source}})\n\
         MATCH (tgt {{id: $target}})\n\
         MERGE (src)-[:{rel}]->(tgt)",
        rel = rel.as_str(),
    )
}

/// Artifact scan queries, one per embeddable label, deterministic order.
pub const SCAN_REQUIREMENTS: &str = "MATCH (n:Requirement)\n\
     RETURN n.id AS id, coalesce(n.title, '') AS title, coalesce(n.text, '') AS text\n\
     ORDER BY id";

pub const SCAN_TEST_CASES: &str = "MATCH (n:TestCase)\n\
     RETURN n.id AS id, coalesce(n.name, '') AS name, \
     coalesce(n.description, '') AS description\n\
     ORDER BY id";

pub const SCAN_TEST_RUNS: &str = "MATCH (n:TestRun)\n\
     RETURN n.id AS id, coalesce(n.status, '') AS status, coalesce(n.log, '') AS log\n\
     ORDER BY id";

/// Requirement neighborhood. Test cases are matched independently of their
/// runs, so a case without executions still appears; docs are the union of
/// `CONTAINS` and `BELONGS_TO_DOC`, both anchored on the matched node.
pub const EXPAND_REQUIREMENTS: &str = "MATCH (r:Requirement) WHERE r.id IN $ids\n\
     OPTIONAL MATCH (r)-[:VERIFIED_BY]->(tc:TestCase)\n\
     OPTIONAL MATCH (tc)-[:EXECUTED_IN]->(tr:TestRun)\n\
     OPTIONAL MATCH (r)<-[:USES_REQUIREMENT]-(c:Customer)\n\
     OPTIONAL MATCH (r)<-[:RELATED_TO]-(cr:CustomerRequirement)\n\
     OPTIONAL MATCH (doc:ReqDoc)-[:CONTAINS]->(r)\n\
     OPTIONAL MATCH (r)-[:BELONGS_TO_DOC]->(doc2:ReqDoc)\n\
     RETURN r.id AS reqId,\n\
            collect(DISTINCT tc.id) AS testCases,\n\
            collect(DISTINCT tr.id) AS testRuns,\n\
            collect(DISTINCT c.id) AS customers,\n\
            collect(DISTINCT cr.id) AS customerReqs,\n\
            collect(DISTINCT doc.id) + collect(DISTINCT doc2.id) AS reqDocs";

pub const EXPAND_TEST_CASES: &str = "MATCH (tc:TestCase) WHERE tc.id IN $ids\n\
     OPTIONAL MATCH (r:Requirement)-[:VERIFIED_BY]->(tc)\n\
     OPTIONAL MATCH (tc)-[:EXECUTED_IN]->(tr:TestRun)\n\
     RETURN tc.id AS tcId,\n\
            collect(DISTINCT r.id) AS requirements,\n\
            collect(DISTINCT tr.id) AS testRuns";

pub const EXPAND_TEST_RUNS: &str = "MATCH (tr:TestRun) WHERE tr.id IN $ids\n\
     OPTIONAL MATCH (tc:TestCase)-[:EXECUTED_IN]->(tr)\n\
     OPTIONAL MATCH (r:Requirement)-[:VERIFIED_BY]->(tc)\n\
     RETURN tr.id AS trId,\n\
            collect(DISTINCT tc.id) AS testCases,\n\
            collect(DISTINCT r.id) AS requirements";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_cover_every_label() {
        let statements = constraint_statements();
        assert_eq!(statements.len(), 7);
        assert!(statements[0]
            .contains("CREATE CONSTRAINT requirement_id IF NOT EXISTS FOR (n:Requirement)"));
        assert!(statements.iter().all(|s| s.contains("REQUIRE n.id IS UNIQUE")));
    }

    #[test]
    fn merge_node_quotes_keys_and_numbers_params() {
        let text = merge_node(EntityKind::Requirement, &["title", "text"]);
        assert!(text.starts_with("MERGE (n:Requirement {id: $id})"));
        assert!(text.contains("n.`title` = $p0"));
        assert!(text.contains("n.`text` = $p1"));

        let bare = merge_node(EntityKind::Srd, &[]);
        assert_eq!(bare, "MERGE (n:Srd {id: $id})");
    }

    #[test]
    fn strict_edges_match_instead_of_merge() {
        let from = NodeRef::new(EntityKind::Requirement, "R1");
        let to = NodeRef::new(EntityKind::TestCase, "TC1");
        let strict = match_edge(&from, RelKind::VerifiedBy, &to);
        assert!(strict.starts_with("MATCH (a:Requirement {id: $from_id})"));
        assert!(strict.contains("MERGE (a)-[:VERIFIED_BY]->(b)"));

        let merged = merge_edge(&from, RelKind::VerifiedBy, &to);
        assert!(merged.starts_with("MERGE (a:Requirement {id: $from_id})"));
    }

    #[test]
    fn link_any_uses_only_validated_types() {
        let rel = RelType::parse("depends_on").unwrap();
        let text = link_any(&rel);
        assert!(text.contains("MERGE (src)-[:DEPENDS_ON]->(tgt)"));
        assert!(!text.contains('`'));
    }

    #[test]
    fn property_key_filter_rejects_non_identifiers() {
        assert!(is_property_key("title"));
        assert!(is_property_key("_rev"));
        assert!(is_property_key("asil_level2"));
        assert!(!is_property_key(""));
        assert!(!is_property_key("2fast"));
        assert!(!is_property_key("weird key"));
        assert!(!is_property_key("tick`injection"));
        assert!(!is_property_key(&"k".repeat(129)));
    }
}
