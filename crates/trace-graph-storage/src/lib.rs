//! Qdrant-backed vector index.
//!
//! Implements [`VectorIndex`](trace_graph_core::traits::VectorIndex) over a
//! Qdrant collection with cosine similarity. Point identity is the v5 UUID
//! of the composite `Type:business_id` key (Qdrant point ids must be UUIDs
//! or integers); the raw key travels in the payload.

mod qdrant_index;

pub use qdrant_index::QdrantVectorIndex;
