//! Core trait seams implemented by the backend adapter crates.

pub mod chat_provider;
pub mod embedding_provider;
pub mod graph_store;
pub mod vector_index;

pub use chat_provider::{ChatMessage, ChatProvider, ChatRole};
pub use embedding_provider::EmbeddingProvider;
pub use graph_store::GraphStore;
pub use vector_index::VectorIndex;
