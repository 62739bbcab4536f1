//! Neighborhood seeds and the typed expansion result.

use serde::{Deserialize, Serialize};

use crate::types::entity::ArtifactKind;

/// Hit ids grouped by artifact kind, deduplicated, first-seen order.
///
/// This is the input contract of the neighborhood expander: a bucket that
/// was never populated means "do not query this kind", which is distinct
/// from "queried, no neighbors".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborhoodSeeds {
    pub requirements: Vec<String>,
    pub test_cases: Vec<String>,
    pub test_runs: Vec<String>,
}

impl NeighborhoodSeeds {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.test_cases.is_empty() && self.test_runs.is_empty()
    }

    pub fn bucket(&self, kind: ArtifactKind) -> &[String] {
        match kind {
            ArtifactKind::Requirement => &self.requirements,
            ArtifactKind::TestCase => &self.test_cases,
            ArtifactKind::TestRun => &self.test_runs,
        }
    }

    /// Append an id to its kind's bucket unless already present.
    pub fn push_unique(&mut self, kind: ArtifactKind, id: &str) {
        let bucket = match kind {
            ArtifactKind::Requirement => &mut self.requirements,
            ArtifactKind::TestCase => &mut self.test_cases,
            ArtifactKind::TestRun => &mut self.test_runs,
        };
        if !bucket.iter().any(|existing| existing == id) {
            bucket.push(id.to_string());
        }
    }

    /// Total number of seeded ids across all buckets.
    pub fn len(&self) -> usize {
        self.requirements.len() + self.test_cases.len() + self.test_runs.len()
    }
}

/// Neighbors of one matched requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementNeighbors {
    pub req_id: String,
    pub test_cases: Vec<String>,
    pub test_runs: Vec<String>,
    pub customers: Vec<String>,
    pub customer_reqs: Vec<String>,
    pub req_docs: Vec<String>,
}

/// Neighbors of one matched test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseNeighbors {
    pub tc_id: String,
    pub requirements: Vec<String>,
    pub test_runs: Vec<String>,
}

/// Neighbors of one matched test run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunNeighbors {
    pub tr_id: String,
    pub test_cases: Vec<String>,
    pub requirements: Vec<String>,
}

/// The bounded graph neighborhood around a seed set.
///
/// A kind whose seed bucket was empty is `None` here (the key is omitted
/// from serialized output entirely), so callers can tell "not queried"
/// from "queried, nothing adjacent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNeighborhood {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<RequirementNeighbors>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCaseNeighbors>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_runs: Option<Vec<TestRunNeighbors>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_unique_deduplicates_within_bucket() {
        let mut seeds = NeighborhoodSeeds::default();
        seeds.push_unique(ArtifactKind::Requirement, "R1");
        seeds.push_unique(ArtifactKind::Requirement, "R2");
        seeds.push_unique(ArtifactKind::Requirement, "R1");
        seeds.push_unique(ArtifactKind::TestCase, "R1");
        assert_eq!(seeds.requirements, vec!["R1", "R2"]);
        assert_eq!(seeds.test_cases, vec!["R1"]);
        assert_eq!(seeds.len(), 3);
    }

    #[test]
    fn unqueried_kinds_are_omitted_from_json() {
        let hood = GraphNeighborhood {
            requirements: Some(vec![RequirementNeighbors {
                req_id: "R1".into(),
                test_cases: vec!["TC1".into()],
                ..Default::default()
            }]),
            test_cases: None,
            test_runs: None,
        };
        let json = serde_json::to_value(&hood).unwrap();
        assert!(json.get("requirements").is_some());
        assert!(json.get("testCases").is_none());
        assert!(json.get("testRuns").is_none());
        assert_eq!(json["requirements"][0]["reqId"], "R1");
        assert_eq!(json["requirements"][0]["testCases"][0], "TC1");
    }
}
