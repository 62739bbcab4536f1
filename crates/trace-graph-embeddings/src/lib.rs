//! Ollama-backed language service adapters.
//!
//! One HTTP client implementing both core provider traits:
//! [`EmbeddingProvider`](trace_graph_core::traits::EmbeddingProvider) via
//! `/api/embeddings` and
//! [`ChatProvider`](trace_graph_core::traits::ChatProvider) via `/api/chat`.
//! Both calls carry bounded timeouts; neither retries.

mod ollama;

pub use ollama::OllamaClient;
