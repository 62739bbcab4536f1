//! Hybrid retrieval integration tests against the in-memory stubs.

use std::sync::Arc;

use serde_json::json;

use trace_graph_core::answer::Answerer;
use trace_graph_core::records::ImportBatch;
use trace_graph_core::stubs::{
    InMemoryGraphStore, InMemoryVectorIndex, ScriptedChatProvider, StubEmbeddingProvider,
};
use trace_graph_core::traits::{ChatRole, EmbeddingProvider, GraphStore, VectorIndex};
use trace_graph_core::types::{ArtifactKind, PointKey, VectorEntry};
use trace_graph_core::{HybridEngine, ImportPipeline, Importer, IndexSynchronizer};

struct Fixture {
    graph: Arc<InMemoryGraphStore>,
    index: Arc<InMemoryVectorIndex>,
    embedder: Arc<StubEmbeddingProvider>,
    engine: Arc<HybridEngine>,
}

impl Fixture {
    fn new() -> Self {
        let graph = Arc::new(InMemoryGraphStore::new());
        let index = Arc::new(InMemoryVectorIndex::new());
        let embedder = Arc::new(StubEmbeddingProvider::new());
        let engine = Arc::new(HybridEngine::new(
            embedder.clone() as Arc<dyn EmbeddingProvider>,
            index.clone() as Arc<dyn VectorIndex>,
            graph.clone() as Arc<dyn GraphStore>,
        ));
        Self { graph, index, embedder, engine }
    }

    async fn import(&self, value: serde_json::Value) {
        let batch: ImportBatch = serde_json::from_value(value).unwrap();
        let pipeline = ImportPipeline::new(
            Importer::new(self.graph.clone() as Arc<dyn GraphStore>),
            Arc::new(IndexSynchronizer::new(
                self.graph.clone() as Arc<dyn GraphStore>,
                self.embedder.clone() as Arc<dyn EmbeddingProvider>,
                self.index.clone() as Arc<dyn VectorIndex>,
            )),
        );
        pipeline.run(&batch).await.unwrap();
    }

    async fn import_traceability_fixture(&self) {
        self.import(json!({
            "requirements": [
                {"id": "R1", "title": "Brakes", "text": "must stop", "ReqDocNo": "D1"},
                {"id": "R2", "title": "Display", "text": "login screen renders"},
            ],
            "testCases": [
                {"id": "TC1", "name": "brake test", "description": "brakes stop the car", "verifies": ["R1"]},
            ],
            "testRuns": [
                {"id": "TR1", "status": "passed", "log": "brakes ok", "testCaseId": "TC1"},
            ],
        }))
        .await;
    }
}

#[tokio::test]
async fn retrieve_returns_vector_match_and_neighborhood_for_brakes() {
    let fx = Fixture::new();
    fx.import_traceability_fixture().await;

    let context = fx.engine.retrieve("brakes").await.unwrap();

    let top_requirement = context
        .vector_matches
        .iter()
        .find(|m| m.kind == ArtifactKind::Requirement)
        .expect("a requirement match for 'brakes'");
    assert_eq!(top_requirement.id, "R1");
    assert!(top_requirement.text.is_none(), "hybrid matches are id/type/score only");

    let requirements = context.graph_neighbourhood.requirements.as_ref().unwrap();
    let r1 = requirements.iter().find(|r| r.req_id == "R1").unwrap();
    assert_eq!(r1.test_cases, vec!["TC1"]);
    assert_eq!(r1.test_runs, vec!["TR1"]);
    assert_eq!(r1.req_docs, vec!["D1"]);
}

#[tokio::test]
async fn neighborhood_ids_come_from_their_seed_buckets() {
    let fx = Fixture::new();
    fx.import_traceability_fixture().await;

    let context = fx.engine.retrieve("brakes stop test").await.unwrap();

    // Rebuild the seed buckets the engine must have used.
    let vector = fx.embedder.embed("brakes stop test").await.unwrap();
    let hits = fx.index.search(&vector, 5).await.unwrap();
    let seeds = trace_graph_core::retrieval::group_hits(&hits);

    let bucket_sum = seeds.len();
    assert!(bucket_sum <= hits.len());

    if let Some(reqs) = &context.graph_neighbourhood.requirements {
        for entry in reqs {
            assert!(seeds.requirements.contains(&entry.req_id));
        }
    }
    if let Some(tcs) = &context.graph_neighbourhood.test_cases {
        for entry in tcs {
            assert!(seeds.test_cases.contains(&entry.tc_id));
        }
    }
    if let Some(trs) = &context.graph_neighbourhood.test_runs {
        for entry in trs {
            assert!(seeds.test_runs.contains(&entry.tr_id));
        }
    }
}

#[tokio::test]
async fn unqueried_kinds_are_absent_not_empty() {
    let fx = Fixture::new();
    fx.import(json!({
        "requirements": [{"id": "R1", "title": "Brakes", "text": "must stop"}],
    }))
    .await;

    let context = fx.engine.retrieve("brakes").await.unwrap();
    assert!(context.graph_neighbourhood.requirements.is_some());
    assert!(context.graph_neighbourhood.test_cases.is_none());
    assert!(context.graph_neighbourhood.test_runs.is_none());
}

#[tokio::test]
async fn retrieval_is_deterministic_for_a_fixed_index_state() {
    let fx = Fixture::new();
    fx.import_traceability_fixture().await;

    let first = fx.engine.retrieve("brakes must stop").await.unwrap();
    let second = fx.engine.retrieve("brakes must stop").await.unwrap();
    assert_eq!(first, second);

    let matches_a = fx.engine.vector_search("brakes must stop").await.unwrap();
    let matches_b = fx.engine.vector_search("brakes must stop").await.unwrap();
    assert_eq!(matches_a, matches_b);
}

#[tokio::test]
async fn vector_search_carries_stored_text() {
    let fx = Fixture::new();
    fx.import_traceability_fixture().await;

    let matches = fx.engine.vector_search("brakes").await.unwrap();
    let r1 = matches.iter().find(|m| m.id == "R1").unwrap();
    assert_eq!(r1.text.as_deref(), Some("Brakes\nmust stop"));
}

#[tokio::test]
async fn dangling_vector_hit_degrades_to_empty_neighborhood() {
    let fx = Fixture::new();

    // An index entry whose node never existed in the graph: a stale entry
    // by construction.
    fx.index.ensure_collection(fx.embedder.dimension()).await.unwrap();
    let ghost_vector = fx.embedder.embed("phantom braking artifact").await.unwrap();
    fx.index
        .upsert(vec![VectorEntry::new(
            PointKey::new(ArtifactKind::Requirement, "GHOST"),
            ghost_vector,
            "phantom braking artifact",
        )])
        .await
        .unwrap();

    let context = fx.engine.retrieve("phantom braking artifact").await.unwrap();

    assert_eq!(context.vector_matches.len(), 1);
    assert_eq!(context.vector_matches[0].id, "GHOST");
    // The requirements bucket was queried but GHOST resolves to nothing.
    let requirements = context.graph_neighbourhood.requirements.as_ref().unwrap();
    assert!(requirements.is_empty());
}

#[tokio::test]
async fn empty_index_yields_empty_context() {
    let fx = Fixture::new();
    fx.index.ensure_collection(fx.embedder.dimension()).await.unwrap();

    let context = fx.engine.retrieve("anything").await.unwrap();
    assert!(context.vector_matches.is_empty());
    assert!(context.graph_neighbourhood.requirements.is_none());
    assert!(context.graph_neighbourhood.test_cases.is_none());
    assert!(context.graph_neighbourhood.test_runs.is_none());
}

#[tokio::test]
async fn answer_grounds_the_chat_prompt_in_the_neighborhood() {
    let fx = Fixture::new();
    fx.import_traceability_fixture().await;

    let chat = Arc::new(ScriptedChatProvider::new("R1 is verified by TC1."));
    let answerer = Answerer::new(fx.engine.clone(), chat.clone());

    let outcome = answerer.answer("which test verifies the brakes?").await.unwrap();
    assert_eq!(outcome.answer, "R1 is verified by TC1.");
    assert_eq!(outcome.query, "which test verifies the brakes?");
    assert!(outcome.data_used.requirements.is_some());

    let requests = chat.requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0];
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[0].content.contains("traceability assistant"));
    assert_eq!(messages[1].role, ChatRole::User);
    assert!(messages[1].content.contains("which test verifies the brakes?"));
    assert!(messages[1].content.contains("\"reqId\": \"R1\""));
}
