//! Chat completion trait: the answering adapter boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Trait for chat completion.
///
/// An opaque messages-in, text-out boundary. Failures surface as
/// [`ServiceError`](crate::error::ServiceError); no retry happens here.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Produce a completion for the given conversation.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Identifier of the chat model, for logging.
    fn model_id(&self) -> &str;
}
