//! In-memory stub implementations of the core traits.
//!
//! Test only. These are real implementations of the trait semantics
//! (genuine merge/strict-match behavior, linear-scan cosine search), not
//! mocks, so the pipelines can be exercised end to end without external
//! backends. None of them persist anything, and the vector stub searches
//! in O(n); do not use them outside tests.

pub mod chat_stub;
pub mod embedding_stub;
pub mod graph_store_stub;
pub mod vector_index_stub;

pub use chat_stub::ScriptedChatProvider;
pub use embedding_stub::StubEmbeddingProvider;
pub use graph_store_stub::InMemoryGraphStore;
pub use vector_index_stub::InMemoryVectorIndex;
