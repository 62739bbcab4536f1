//! Contextual question answering over the hybrid retrieval result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::retrieval::HybridEngine;
use crate::traits::{ChatMessage, ChatProvider};
use crate::types::GraphNeighborhood;

const SYSTEM_PROMPT: &str = "You are a traceability assistant. You receive a question and data \
about requirements, test cases, test runs, customers, documents.\n\
Use only the provided data to answer.";

/// A generated answer together with the neighborhood it was grounded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub query: String,
    pub data_used: GraphNeighborhood,
    pub answer: String,
}

/// Answers natural-language questions from retrieved graph context.
pub struct Answerer {
    engine: Arc<HybridEngine>,
    chat: Arc<dyn ChatProvider>,
}

impl Answerer {
    pub fn new(engine: Arc<HybridEngine>, chat: Arc<dyn ChatProvider>) -> Self {
        Self { engine, chat }
    }

    /// Retrieve context for the query and generate an answer from it.
    ///
    /// The neighborhood is serialized as indented JSON and handed to the
    /// chat model verbatim; the model is instructed to use nothing else.
    pub async fn answer(&self, query: &str) -> Result<AnswerOutcome> {
        let hybrid = self.engine.retrieve(query).await?;
        let context = serde_json::to_string_pretty(&hybrid.graph_neighbourhood)
            .map_err(|e| crate::error::TraceGraphError::internal(e.to_string()))?;

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!("Question:\n{query}\n\nRelevant data:\n{context}")),
        ];
        debug!(query, model = self.chat.model_id(), "requesting answer");
        let answer = self.chat.complete(&messages).await?;

        Ok(AnswerOutcome {
            query: query.to_string(),
            data_used: hybrid.graph_neighbourhood,
            answer,
        })
    }
}
