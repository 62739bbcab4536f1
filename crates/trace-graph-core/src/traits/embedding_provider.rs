//! Embedding provider trait for text-to-vector conversion.
//!
//! Implementations are stateless per call and perform no internal retry:
//! a transport failure or timeout surfaces as
//! [`ServiceError::Unavailable`](crate::error::ServiceError) and retry
//! policy stays with the caller.

use async_trait::async_trait;

use crate::error::{Result, ServiceError};

/// Trait for embedding generation.
///
/// All implementations must be thread-safe (`Send + Sync`) so independent
/// requests can embed concurrently.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// The returned vectors are in the same order and of the same count as
    /// the input. Callers zip inputs with outputs positionally, so an
    /// implementation that cannot guarantee this must fail instead.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (a one-element batch).
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        match vectors.pop() {
            Some(v) if vectors.is_empty() => Ok(v),
            _ => Err(ServiceError::invalid_response(
                "embedding",
                "expected exactly one vector for a one-element batch",
            )
            .into()),
        }
    }

    /// Identifier of the embedding model, for logging.
    fn model_id(&self) -> &str;
}
