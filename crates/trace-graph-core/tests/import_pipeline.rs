//! Import pipeline integration tests against the in-memory stubs.

use std::sync::Arc;

use serde_json::json;

use trace_graph_core::error::{RecordKind, TraceGraphError};
use trace_graph_core::records::ImportBatch;
use trace_graph_core::stubs::{InMemoryGraphStore, InMemoryVectorIndex, StubEmbeddingProvider};
use trace_graph_core::types::EntityKind;
use trace_graph_core::{ImportPipeline, Importer, IndexSynchronizer};

fn batch(value: serde_json::Value) -> ImportBatch {
    serde_json::from_value(value).expect("valid batch json")
}

fn pipeline(
    graph: &Arc<InMemoryGraphStore>,
    index: &Arc<InMemoryVectorIndex>,
) -> ImportPipeline {
    let graph_dyn: Arc<dyn trace_graph_core::traits::GraphStore> = graph.clone();
    let index_dyn: Arc<dyn trace_graph_core::traits::VectorIndex> = index.clone();
    let embedder: Arc<dyn trace_graph_core::traits::EmbeddingProvider> =
        Arc::new(StubEmbeddingProvider::new());
    ImportPipeline::new(
        Importer::new(graph_dyn.clone()),
        Arc::new(IndexSynchronizer::new(graph_dyn, embedder, index_dyn)),
    )
}

#[tokio::test]
async fn requirement_import_creates_node_doc_edge_and_vector_entry() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    let outcome = pipeline
        .run(&batch(json!({
            "requirements": [
                {"id": "R1", "title": "Brakes", "text": "must stop", "ReqDocNo": "D1"}
            ]
        })))
        .await
        .unwrap();

    assert_eq!(outcome.report.requirements, 1);
    assert_eq!(outcome.synced_vectors, 1);

    let props = graph.node_props(EntityKind::Requirement, "R1").unwrap();
    assert_eq!(props["title"], "Brakes");
    assert_eq!(props["text"], "must stop");
    assert!(graph.has_edge(
        (EntityKind::ReqDoc, "D1"),
        "CONTAINS",
        (EntityKind::Requirement, "R1")
    ));

    assert_eq!(index.entry_keys(), vec!["Requirement:R1"]);
    assert_eq!(index.text_of("Requirement:R1").unwrap(), "Brakes\nmust stop");
}

#[tokio::test]
async fn importing_the_same_requirement_twice_is_idempotent() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    let payload = json!({
        "requirements": [{
            "id": "R1",
            "title": "Brakes",
            "text": "must stop",
            "ReqDocNo": "D1",
            "Customer": {"id": "C1", "name": "Acme"},
            "parents": ["R0"],
        }]
    });

    pipeline.run(&batch(payload.clone())).await.unwrap();
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let props = graph.node_props(EntityKind::Requirement, "R1").unwrap();

    pipeline.run(&batch(payload)).await.unwrap();
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
    assert_eq!(graph.node_props(EntityKind::Requirement, "R1").unwrap(), props);
}

#[tokio::test]
async fn verified_by_is_strict_match() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    pipeline
        .run(&batch(json!({
            "requirements": [{"id": "R1", "title": "Brakes", "text": "must stop"}]
        })))
        .await
        .unwrap();

    // R1 exists: the coverage edge is created.
    pipeline
        .run(&batch(json!({
            "testCases": [{"id": "TC1", "name": "brake test", "verifies": ["R1"]}]
        })))
        .await
        .unwrap();
    assert!(graph.has_edge(
        (EntityKind::Requirement, "R1"),
        "VERIFIED_BY",
        (EntityKind::TestCase, "TC1")
    ));

    // RX was never created: no edge, no error, and no Requirement node
    // fabricated as a side effect.
    pipeline
        .run(&batch(json!({
            "testCases": [{"id": "TC2", "name": "ghost test", "verifies": ["RX"]}]
        })))
        .await
        .unwrap();
    assert!(!graph.has_edge(
        (EntityKind::Requirement, "RX"),
        "VERIFIED_BY",
        (EntityKind::TestCase, "TC2")
    ));
    assert!(graph.node_props(EntityKind::Requirement, "RX").is_none());
}

#[tokio::test]
async fn executed_in_follows_the_same_strict_policy() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    pipeline
        .run(&batch(json!({
            "testCases": [{"id": "TC1", "name": "brake test"}],
            "testRuns": [
                {"id": "TR1", "status": "passed", "testCaseId": "TC1"},
                {"id": "TR2", "status": "failed", "testCaseId": "TC-MISSING"},
            ]
        })))
        .await
        .unwrap();

    assert!(graph.has_edge(
        (EntityKind::TestCase, "TC1"),
        "EXECUTED_IN",
        (EntityKind::TestRun, "TR1")
    ));
    assert!(!graph.has_edge(
        (EntityKind::TestCase, "TC-MISSING"),
        "EXECUTED_IN",
        (EntityKind::TestRun, "TR2")
    ));
    graph.assert_no_dangling_edges();
}

#[tokio::test]
async fn merge_create_edges_never_dangle() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    // Parents, customers, and docs referencing nodes that do not exist yet:
    // all merge-created, so every edge has real endpoints.
    pipeline
        .run(&batch(json!({
            "requirements": [{
                "id": "R3",
                "title": "Child",
                "ReqDocNo": "D1",
                "src": {"docno": "D2"},
                "Customer": ["C1", {"id": "C2", "name": "Globex"}],
                "parents": ["R-UNSEEN", "CR7"],
                "customer_req": ["CR7"],
                "srd": [{"no": "S1", "rev": "B"}, {"rev": "C"}],
            }]
        })))
        .await
        .unwrap();

    graph.assert_no_dangling_edges();
    assert!(graph.has_edge(
        (EntityKind::Requirement, "R-UNSEEN"),
        "PARENT_OF",
        (EntityKind::Requirement, "R3")
    ));
    assert!(graph.has_edge(
        (EntityKind::CustomerRequirement, "CR7"),
        "RELATED_TO",
        (EntityKind::Requirement, "R3")
    ));
    assert!(graph.has_edge(
        (EntityKind::ReqDoc, "D2"),
        "REFERS_REQUIREMENT",
        (EntityKind::Requirement, "R3")
    ));
    assert!(graph.has_edge(
        (EntityKind::Requirement, "R3"),
        "BELONGS_TO_DOC",
        (EntityKind::ReqDoc, "S1")
    ));
    assert!(graph.has_edge(
        (EntityKind::Srd, "R3-srd-unknown"),
        "ASSOCIATED_WITH",
        (EntityKind::Requirement, "R3")
    ));
    let customer = graph.node_props(EntityKind::Customer, "C2").unwrap();
    assert_eq!(customer["name"], "Globex");
}

#[tokio::test]
async fn generic_links_connect_existing_nodes_of_any_label() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    pipeline
        .run(&batch(json!({
            "requirements": [{"id": "R1", "title": "Brakes"}],
            "testRuns": [{"id": "TR1", "status": "passed"}],
            "links": [
                {"sourceId": "R1", "targetId": "TR1", "linkType": "observed_in"},
                {"sourceId": "R1", "targetId": "NOWHERE"},
            ]
        })))
        .await
        .unwrap();

    assert!(graph.has_edge(
        (EntityKind::Requirement, "R1"),
        "OBSERVED_IN",
        (EntityKind::TestRun, "TR1")
    ));
    graph.assert_no_dangling_edges();
}

#[tokio::test]
async fn malformed_link_type_fails_the_links_kind_only() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    let err = pipeline
        .run(&batch(json!({
            "requirements": [{"id": "R1", "title": "Brakes"}],
            "links": [{"sourceId": "R1", "targetId": "R1", "linkType": "X]->() DELETE"}]
        })))
        .await
        .unwrap_err();

    match err {
        TraceGraphError::Import(e) => assert_eq!(e.kind, RecordKind::Links),
        other => panic!("expected an import error, got {other}"),
    }
    // Requirements were committed before links failed; import is not atomic
    // across kinds.
    assert!(graph.node_props(EntityKind::Requirement, "R1").is_some());
}

#[tokio::test]
async fn record_missing_id_names_its_kind() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    let err = pipeline
        .run(&batch(json!({
            "requirements": [{"id": "R1", "title": "Brakes"}],
            "testCases": [{"name": "nameless"}]
        })))
        .await
        .unwrap_err();

    match err {
        TraceGraphError::Import(e) => {
            assert_eq!(e.kind, RecordKind::TestCases);
            assert!(e.source.to_string().contains("missing id"));
        }
        other => panic!("expected an import error, got {other}"),
    }
    assert!(graph.node_props(EntityKind::Requirement, "R1").is_some());
}

#[tokio::test]
async fn empty_graph_syncs_zero_vectors() {
    let graph = Arc::new(InMemoryGraphStore::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = pipeline(&graph, &index);

    let outcome = pipeline.run(&batch(json!({}))).await.unwrap();
    assert_eq!(outcome.synced_vectors, 0);
    assert!(index.is_empty());
}
