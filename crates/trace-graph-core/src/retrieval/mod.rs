//! Hybrid retrieval: vector similarity search expanded into a bounded
//! graph neighborhood.

pub mod engine;
pub mod grouping;

pub use engine::{HybridContext, HybridEngine};
pub use grouping::group_hits;
