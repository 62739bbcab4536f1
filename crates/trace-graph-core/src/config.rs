//! Service configuration.
//!
//! Connection parameters for the three external backends (graph, vector,
//! language services) plus retrieval tuning. Values come from the
//! environment with the historical variable names, so an existing
//! deployment keeps working unchanged. Nothing is read at use sites:
//! the binary builds one [`ServiceConfig`] and injects the constructed
//! clients.

use serde::Deserialize;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Full service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub neo4j: Neo4jConfig,
    pub qdrant: QdrantConfig,
    pub ollama: OllamaConfig,
    pub retrieval: RetrievalConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            neo4j: Neo4jConfig::default(),
            qdrant: QdrantConfig::default(),
            ollama: OllamaConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment, falling back to defaults
    /// suitable for a local docker-compose stack.
    pub fn from_env() -> Self {
        Self {
            neo4j: Neo4jConfig {
                uri: env_or("NEO4J_URI", "bolt://localhost:7687"),
                user: env_or("NEO4J_USER", "neo4j"),
                password: env_or("NEO4J_PASS", "password"),
            },
            qdrant: QdrantConfig {
                url: env_or("QDRANT_URL", "http://localhost:6333"),
                collection: env_or("QDRANT_COLLECTION", "trace_artifacts"),
            },
            ollama: OllamaConfig {
                url: env_or("OLLAMA_URL", "http://localhost:11434"),
                embed_model: env_or("EMBED_MODEL", "nomic-embed-text"),
                chat_model: env_or("CHAT_MODEL", "llama3"),
                ..OllamaConfig::default()
            },
            retrieval: RetrievalConfig::default(),
        }
    }
}

/// Graph backend connection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Vector backend connection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    /// Collection holding the artifact vectors.
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "trace_artifacts".to_string(),
        }
    }
}

/// Embedding / chat service parameters.
///
/// The timeouts bound the only two calls that may stall indefinitely;
/// graph and vector calls rely on their drivers' own behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub embed_timeout_secs: u64,
    pub chat_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            chat_model: "llama3".to_string(),
            embed_timeout_secs: 120,
            chat_timeout_secs: 300,
        }
    }
}

/// Retrieval tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest neighbors fetched per query.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}
