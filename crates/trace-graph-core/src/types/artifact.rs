//! Embeddable artifact rows and the per-type content rule.

use crate::types::entity::{ArtifactKind, PointKey};

/// Type-specific text fields of an embeddable node, as read back from the
/// graph. Missing properties are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFields {
    Requirement { title: String, text: String },
    TestCase { name: String, description: String },
    TestRun { status: String, log: String },
}

/// One Requirement/TestCase/TestRun node scanned from the graph for
/// embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
    pub id: String,
    pub fields: ArtifactFields,
}

impl ArtifactRow {
    pub fn kind(&self) -> ArtifactKind {
        match self.fields {
            ArtifactFields::Requirement { .. } => ArtifactKind::Requirement,
            ArtifactFields::TestCase { .. } => ArtifactKind::TestCase,
            ArtifactFields::TestRun { .. } => ArtifactKind::TestRun,
        }
    }

    pub fn key(&self) -> PointKey {
        PointKey::new(self.kind(), self.id.clone())
    }

    /// The fixed per-type content string handed to the embedder.
    pub fn content(&self) -> String {
        match &self.fields {
            ArtifactFields::Requirement { title, text } => format!("{title}\n{text}"),
            ArtifactFields::TestCase { name, description } => format!("{name}\n{description}"),
            ArtifactFields::TestRun { status, log } => {
                format!("TestRun {} status {status}\n{log}", self.id)
            }
        }
    }
}
