//! HTTP endpoints.
//!
//! - `GET  /health`: liveness
//! - `POST /import-json`: `{data}` batch import + index sync
//! - `POST /search/vector`: `{query}` ranked similarity matches
//! - `POST /search/hybrid`: `{query}` matches + graph neighborhood
//! - `POST /ask`: `{query}` neighborhood-grounded answer

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use trace_graph_core::answer::{Answerer, AnswerOutcome};
use trace_graph_core::records::ImportBatch;
use trace_graph_core::types::{GraphNeighborhood, VectorMatch};
use trace_graph_core::{HybridEngine, ImportPipeline};

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImportPipeline>,
    pub engine: Arc<HybridEngine>,
    pub answerer: Arc<Answerer>,
}

/// Build the router with all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/import-json", post(import_json))
        .route("/search/vector", post(search_vector))
        .route("/search/hybrid", post(search_hybrid))
        .route("/ask", post(ask))
        .with_state(state)
}

// ── Request / response types ────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImportRequest {
    /// The batch payload (`requirements`, `testCases`, `testRuns`, `links`).
    pub data: ImportBatch,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub status: &'static str,
    pub requirements: usize,
    #[serde(rename = "testCases")]
    pub test_cases: usize,
    #[serde(rename = "testRuns")]
    pub test_runs: usize,
    pub links: usize,
    #[serde(rename = "syncedVectors")]
    pub synced_vectors: usize,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct VectorSearchResponse {
    pub query: String,
    pub matches: Vec<VectorMatch>,
}

#[derive(Serialize)]
pub struct HybridSearchResponse {
    pub query: String,
    pub vector_matches: Vec<VectorMatch>,
    pub graph_neighbourhood: GraphNeighborhood,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn import_json(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let outcome = state.pipeline.run(&req.data).await?;
    Ok(Json(ImportResponse {
        status: "imported",
        requirements: outcome.report.requirements,
        test_cases: outcome.report.test_cases,
        test_runs: outcome.report.test_runs,
        links: outcome.report.links,
        synced_vectors: outcome.synced_vectors,
    }))
}

async fn search_vector(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<VectorSearchResponse>, ApiError> {
    let matches = state.engine.vector_search(&req.query).await?;
    Ok(Json(VectorSearchResponse { query: req.query, matches }))
}

async fn search_hybrid(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<HybridSearchResponse>, ApiError> {
    let context = state.engine.retrieve(&req.query).await?;
    Ok(Json(HybridSearchResponse {
        query: req.query,
        vector_matches: context.vector_matches,
        graph_neighbourhood: context.graph_neighbourhood,
    }))
}

async fn ask(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<AnswerOutcome>, ApiError> {
    let outcome = state.answerer.answer(&req.query).await?;
    Ok(Json(outcome))
}
