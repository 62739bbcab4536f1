//! The Ollama HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use trace_graph_core::config::OllamaConfig;
use trace_graph_core::error::{Result, ServiceError};
use trace_graph_core::traits::{ChatMessage, ChatProvider, EmbeddingProvider};

const EMBEDDING_SERVICE: &str = "embedding";
const CHAT_SERVICE: &str = "chat";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize, Default)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Stateless HTTP client for an Ollama instance, implementing both the
/// embedding and chat provider seams.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    embed_timeout: Duration,
    chat_timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        }
    }

    fn transport_error(service: &'static str, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::unavailable(service, "request timed out")
        } else {
            ServiceError::unavailable(service, err.to_string())
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(format!("{}/api/embeddings", self.base_url))
            .timeout(self.embed_timeout)
            .json(&EmbeddingRequest { model: &self.embed_model, prompt: text })
            .send()
            .await
            .map_err(|e| Self::transport_error(EMBEDDING_SERVICE, e))?
            .error_for_status()
            .map_err(|e| Self::transport_error(EMBEDDING_SERVICE, e))?;

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::invalid_response(EMBEDDING_SERVICE, e.to_string()))?;
        if body.embedding.is_empty() {
            return Err(
                ServiceError::invalid_response(EMBEDDING_SERVICE, "empty embedding").into()
            );
        }
        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    /// Embeds texts one request at a time, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        debug!(count = vectors.len(), model = %self.embed_model, "embedded batch");
        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.embed_model
    }
}

#[async_trait]
impl ChatProvider for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.chat_timeout)
            .json(&ChatRequest { model: &self.chat_model, messages, stream: false })
            .send()
            .await
            .map_err(|e| Self::transport_error(CHAT_SERVICE, e))?
            .error_for_status()
            .map_err(|e| Self::transport_error(CHAT_SERVICE, e))?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::invalid_response(CHAT_SERVICE, e.to_string()))?;
        Ok(body.message.map(|m| m.content).unwrap_or_default())
    }

    fn model_id(&self) -> &str {
        &self.chat_model
    }
}
