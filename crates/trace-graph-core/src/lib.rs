//! Trace Graph Core Library
//!
//! Core domain model and orchestration logic for the trace-graph service:
//! a traceability knowledge graph over requirements, test cases, and test
//! runs, paired with a derived vector index for semantic retrieval.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`EntityKind`, `PointKey`, `GraphNeighborhood`, etc.)
//! - Import record types and their normalization into graph operations
//! - Core traits (`GraphStore`, `VectorIndex`, `EmbeddingProvider`,
//!   `ChatProvider`) implemented by the backend adapter crates
//! - The import pipeline (graph upserts followed by a full index re-sync)
//! - The hybrid retrieval engine (vector search + bounded graph expansion)
//! - Error types and result aliases
//! - In-memory stub implementations for tests
//!
//! Backend specifics (Neo4j, Qdrant, Ollama) live in the sibling adapter
//! crates; everything here is expressed against the traits so the pipelines
//! can be exercised without any external service.

pub mod answer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod records;
pub mod retrieval;
pub mod stubs;
pub mod sync;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use error::{Result, TraceGraphError};
pub use ingest::{ImportOutcome, ImportPipeline, ImportReport, Importer};
pub use retrieval::{HybridContext, HybridEngine};
pub use sync::IndexSynchronizer;
