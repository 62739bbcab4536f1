//! Entity labels, relationship kinds, and composite vector keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TraceGraphError;

/// Every node label in the traceability schema.
///
/// Each entity is uniquely keyed by a business id string unique within its
/// label; the label strings are fixed and enum-derived, so they can be
/// spliced into queries without sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Requirement,
    ReqDoc,
    TestCase,
    TestRun,
    Customer,
    CustomerRequirement,
    Srd,
}

impl EntityKind {
    /// The graph label for this entity kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Requirement => "Requirement",
            Self::ReqDoc => "ReqDoc",
            Self::TestCase => "TestCase",
            Self::TestRun => "TestRun",
            Self::Customer => "Customer",
            Self::CustomerRequirement => "CustomerRequirement",
            Self::Srd => "Srd",
        }
    }

    /// All entity kinds, in constraint-application order.
    pub const ALL: [EntityKind; 7] = [
        Self::Requirement,
        Self::ReqDoc,
        Self::TestCase,
        Self::TestRun,
        Self::Customer,
        Self::CustomerRequirement,
        Self::Srd,
    ];
}

/// The subset of entities mirrored into the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactKind {
    Requirement,
    TestCase,
    TestRun,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Requirement => "Requirement",
            Self::TestCase => "TestCase",
            Self::TestRun => "TestRun",
        }
    }

    /// Parse a graph label back into an artifact kind.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Requirement" => Some(Self::Requirement),
            "TestCase" => Some(Self::TestCase),
            "TestRun" => Some(Self::TestRun),
            _ => None,
        }
    }

    pub const ALL: [ArtifactKind; 3] = [Self::Requirement, Self::TestCase, Self::TestRun];
}

impl From<ArtifactKind> for EntityKind {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Requirement => EntityKind::Requirement,
            ArtifactKind::TestCase => EntityKind::TestCase,
            ArtifactKind::TestRun => EntityKind::TestRun,
        }
    }
}

/// The fixed relationship kinds of the traceability schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelKind {
    /// `ReqDoc -CONTAINS-> Requirement`
    Contains,
    /// `ReqDoc -REFERS_REQUIREMENT-> Requirement`
    RefersRequirement,
    /// `Customer -USES_REQUIREMENT-> Requirement`
    UsesRequirement,
    /// `Requirement -PARENT_OF-> Requirement`
    ParentOf,
    /// `CustomerRequirement -RELATED_TO-> Requirement`
    RelatedTo,
    /// `Requirement -BELONGS_TO_DOC-> ReqDoc`
    BelongsToDoc,
    /// `Srd -ASSOCIATED_WITH-> Requirement`
    AssociatedWith,
    /// `Requirement -VERIFIED_BY-> TestCase`
    VerifiedBy,
    /// `TestCase -EXECUTED_IN-> TestRun`
    ExecutedIn,
}

impl RelKind {
    /// The relationship type string. Fixed set, safe to splice into queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::RefersRequirement => "REFERS_REQUIREMENT",
            Self::UsesRequirement => "USES_REQUIREMENT",
            Self::ParentOf => "PARENT_OF",
            Self::RelatedTo => "RELATED_TO",
            Self::BelongsToDoc => "BELONGS_TO_DOC",
            Self::AssociatedWith => "ASSOCIATED_WITH",
            Self::VerifiedBy => "VERIFIED_BY",
            Self::ExecutedIn => "EXECUTED_IN",
        }
    }

    /// Endpoint-creation policy for this edge kind.
    ///
    /// This is the one place where the policy lives: test-coverage edges
    /// (`VERIFIED_BY`, `EXECUTED_IN`) are created only when both endpoints
    /// already exist and are silently skipped otherwise; every other schema
    /// edge merge-creates its endpoints so it can never dangle.
    pub fn policy(&self) -> crate::types::op::EdgePolicy {
        use crate::types::op::EdgePolicy;
        match self {
            Self::VerifiedBy | Self::ExecutedIn => EdgePolicy::RequireEndpoints,
            _ => EdgePolicy::MergeEndpoints,
        }
    }
}

/// A validated relationship type for generic links.
///
/// Caller-supplied link types never reach a query as raw strings: they must
/// parse as a relationship identifier (leading letter, then letters, digits
/// or underscores, at most 64 characters) and are normalized to upper case.
/// Anything else is rejected with a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelType(String);

impl RelType {
    /// The default type for generic links with no explicit `linkType`.
    pub fn links_to() -> Self {
        Self("LINKS_TO".to_string())
    }

    /// Validate and normalize a caller-supplied relationship type.
    pub fn parse(raw: &str) -> Result<Self, TraceGraphError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::links_to());
        }
        if trimmed.len() > 64 {
            return Err(TraceGraphError::validation(format!(
                "relationship type too long ({} chars, max 64)",
                trimmed.len()
            )));
        }
        let mut chars = trimmed.chars();
        let first_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
        let rest_ok = trimmed.chars().skip(1).all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !first_ok || !rest_ok {
            return Err(TraceGraphError::validation(format!(
                "relationship type {trimmed:?} is not a valid identifier"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key of a vector index entry: `"{Type}:{business_id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointKey {
    pub kind: ArtifactKind,
    pub id: String,
}

impl PointKey {
    pub fn new(kind: ArtifactKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Parse `"Requirement:R1"` style keys.
    pub fn parse(raw: &str) -> Option<Self> {
        let (label, id) = raw.split_once(':')?;
        let kind = ArtifactKind::from_label(label)?;
        if id.is_empty() {
            return None;
        }
        Some(Self::new(kind, id))
    }

    /// Deterministic point identity for backends that require UUID ids.
    ///
    /// v5 of the composite key, so re-syncing the same artifact replaces
    /// its entry in place.
    pub fn point_uuid(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.to_string().as_bytes())
    }
}

impl std::fmt::Display for PointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_key_round_trips() {
        let key = PointKey::new(ArtifactKind::Requirement, "R1");
        assert_eq!(key.to_string(), "Requirement:R1");
        assert_eq!(PointKey::parse("Requirement:R1"), Some(key));
        assert_eq!(PointKey::parse("Widget:R1"), None);
        assert_eq!(PointKey::parse("Requirement:"), None);
        assert_eq!(PointKey::parse("Requirement"), None);
    }

    #[test]
    fn point_uuid_is_deterministic() {
        let a = PointKey::new(ArtifactKind::TestCase, "TC1").point_uuid();
        let b = PointKey::new(ArtifactKind::TestCase, "TC1").point_uuid();
        let c = PointKey::new(ArtifactKind::TestRun, "TC1").point_uuid();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rel_type_accepts_identifiers_and_uppercases() {
        assert_eq!(RelType::parse("depends_on").unwrap().as_str(), "DEPENDS_ON");
        assert_eq!(RelType::parse("LINKS_TO").unwrap().as_str(), "LINKS_TO");
        assert_eq!(RelType::parse("").unwrap().as_str(), "LINKS_TO");
        assert_eq!(RelType::parse("  ").unwrap().as_str(), "LINKS_TO");
    }

    #[test]
    fn rel_type_rejects_injection_shaped_strings() {
        assert!(RelType::parse("X]->(n) DETACH DELETE n //").is_err());
        assert!(RelType::parse("1BAD").is_err());
        assert!(RelType::parse("BAD TYPE").is_err());
        assert!(RelType::parse("BAD-TYPE").is_err());
        assert!(RelType::parse(&"A".repeat(65)).is_err());
    }

    #[test]
    fn strict_match_policy_covers_coverage_edges_only() {
        use crate::types::op::EdgePolicy;
        assert_eq!(RelKind::VerifiedBy.policy(), EdgePolicy::RequireEndpoints);
        assert_eq!(RelKind::ExecutedIn.policy(), EdgePolicy::RequireEndpoints);
        assert_eq!(RelKind::Contains.policy(), EdgePolicy::MergeEndpoints);
        assert_eq!(RelKind::ParentOf.policy(), EdgePolicy::MergeEndpoints);
        assert_eq!(RelKind::RelatedTo.policy(), EdgePolicy::MergeEndpoints);
    }
}
