//! Trace Graph service binary.
//!
//! Two modes, mirroring how the service is deployed:
//!
//! - `trace-graph serve [--addr 0.0.0.0:8000]`: apply graph constraints,
//!   then serve the HTTP API
//! - `trace-graph import <file.json>`: apply constraints, import a batch
//!   file, sync the vector index, and print the report

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trace_graph_core::answer::Answerer;
use trace_graph_core::records::ImportBatch;
use trace_graph_core::traits::{ChatProvider, EmbeddingProvider, GraphStore, VectorIndex};
use trace_graph_core::{
    HybridEngine, ImportPipeline, Importer, IndexSynchronizer, ServiceConfig,
};
use trace_graph_embeddings::OllamaClient;
use trace_graph_graph::Neo4jGraphStore;
use trace_graph_server::{router, AppState};
use trace_graph_storage::QdrantVectorIndex;

#[derive(Parser)]
#[command(name = "trace-graph")]
#[command(version)]
#[command(about = "Traceability knowledge graph with hybrid vector + graph search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Listen address.
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
    },
    /// Import a batch JSON file and sync the vector index.
    Import {
        /// Path to a batch file (`requirements`, `testCases`, `testRuns`,
        /// `links`).
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env();
    let state = build_state(&config).await?;

    match cli.command {
        Command::Serve { addr } => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            info!(%addr, "serving trace-graph API");
            axum::serve(listener, router(state)).await?;
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let batch: ImportBatch =
                serde_json::from_str(&raw).context("batch file is not valid import JSON")?;
            let outcome = state.pipeline.run(&batch).await?;
            println!(
                "imported {} requirements, {} test cases, {} test runs, {} links; \
                 synced {} vectors",
                outcome.report.requirements,
                outcome.report.test_cases,
                outcome.report.test_runs,
                outcome.report.links,
                outcome.synced_vectors,
            );
        }
    }

    Ok(())
}

/// Connect the backends, apply constraints, and wire the components.
async fn build_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let graph: Arc<dyn GraphStore> = Arc::new(
        Neo4jGraphStore::connect(&config.neo4j)
            .await
            .context("failed to connect to the graph backend")?,
    );
    let index: Arc<dyn VectorIndex> = Arc::new(
        QdrantVectorIndex::connect(&config.qdrant)
            .context("failed to connect to the vector backend")?,
    );
    let ollama = Arc::new(OllamaClient::new(&config.ollama));
    let embedder: Arc<dyn EmbeddingProvider> = ollama.clone();
    let chat: Arc<dyn ChatProvider> = ollama;

    graph.ensure_constraints().await.context("failed to apply graph constraints")?;

    let sync = Arc::new(IndexSynchronizer::new(graph.clone(), embedder.clone(), index.clone()));
    let pipeline = Arc::new(ImportPipeline::new(Importer::new(graph.clone()), sync));
    let engine = Arc::new(
        HybridEngine::new(embedder, index, graph).with_top_k(config.retrieval.top_k),
    );
    let answerer = Arc::new(Answerer::new(engine.clone(), chat));

    Ok(AppState { pipeline, engine, answerer })
}
