//! Scripted chat provider for answer-flow tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::traits::{ChatMessage, ChatProvider};

/// Returns a fixed completion and records every conversation it was given.
pub struct ScriptedChatProvider {
    reply: String,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), requests: Mutex::new(Vec::new()) }
    }

    /// Conversations passed to [`ChatProvider::complete`], in call order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedChatProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().push(messages.to_vec());
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> &str {
        "stub-chat"
    }
}
