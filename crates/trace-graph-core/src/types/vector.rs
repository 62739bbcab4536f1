//! Vector index entries, hits, and API-facing matches.

use serde::{Deserialize, Serialize};

use crate::types::entity::{ArtifactKind, PointKey};

/// One entry to upsert into the vector index.
///
/// The payload stored alongside the vector is `{type, business_id, text}`;
/// adapters derive it from `key` and `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub key: PointKey,
    pub vector: Vec<f32>,
    pub text: String,
}

impl VectorEntry {
    pub fn new(key: PointKey, vector: Vec<f32>, text: impl Into<String>) -> Self {
        Self { key, vector, text: text.into() }
    }
}

/// One similarity hit returned by the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub key: PointKey,
    pub score: f32,
    pub text: String,
}

/// A ranked match as exposed through the API.
///
/// `text` is populated for plain vector search and omitted from hybrid
/// responses, where the neighborhood carries the context instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl VectorMatch {
    /// Build a match from a hit, with the stored text attached.
    pub fn with_text(hit: &VectorHit) -> Self {
        Self {
            id: hit.key.id.clone(),
            kind: hit.key.kind,
            score: hit.score,
            text: Some(hit.text.clone()),
        }
    }

    /// Build a match from a hit, id/type/score only.
    pub fn ranked_only(hit: &VectorHit) -> Self {
        Self { id: hit.key.id.clone(), kind: hit.key.kind, score: hit.score, text: None }
    }
}
