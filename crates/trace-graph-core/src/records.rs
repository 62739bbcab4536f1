//! Import record types for the batch JSON format.
//!
//! A batch is an object with optional `requirements`, `testCases`,
//! `testRuns`, and `links` arrays. Field shapes follow the upstream ALM
//! export format, which is irregular in two places: a customer reference
//! may be an object or a bare scalar, and it may arrive as a single value
//! or a list. Both irregularities are resolved into tagged unions at this
//! boundary so nothing downstream inspects raw JSON.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A full import batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    #[serde(default)]
    pub requirements: Vec<RequirementRecord>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseRecord>,
    #[serde(default)]
    pub test_runs: Vec<TestRunRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
            && self.test_cases.is_empty()
            && self.test_runs.is_empty()
            && self.links.is_empty()
    }
}

/// One value or a list of values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        match self {
            Self::Many(items) => items.iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
        }
    }
}

/// A customer reference: either an object with id and optional name, or a
/// bare scalar id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Record {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Id(String),
    Numeric(i64),
}

impl CustomerRef {
    /// Resolve to `(id, name)`. Object references without an id resolve to
    /// `None` and are skipped by the importer (a customer node cannot be
    /// keyed without one).
    pub fn resolve(&self) -> Option<(String, Option<String>)> {
        match self {
            Self::Record { id, name } => {
                id.as_ref().map(|id| (id.clone(), name.clone()))
            }
            Self::Id(id) => Some((id.clone(), None)),
            Self::Numeric(n) => Some((n.to_string(), None)),
        }
    }
}

/// The `src` field of a requirement: usually an object carrying `docno`,
/// but tolerated in any shape (non-object sources carry no doc link).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Doc {
        #[serde(default)]
        docno: Option<String>,
    },
    Other(Value),
}

impl SourceRef {
    pub fn docno(&self) -> Option<&str> {
        match self {
            Self::Doc { docno } => docno.as_deref().filter(|s| !s.is_empty()),
            Self::Other(_) => None,
        }
    }
}

/// One item of a requirement's `srd` array.
#[derive(Debug, Clone, Deserialize)]
pub struct SrdRecord {
    #[serde(default)]
    pub no: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SrdRecord {
    /// The item's own id, or the synthesized fallback for items without a
    /// `no` field.
    pub fn effective_id(&self, req_id: &str) -> String {
        match self.no.as_deref().filter(|s| !s.is_empty()) {
            Some(no) => no.to_string(),
            None => format!("{req_id}-srd-unknown"),
        }
    }
}

/// A requirement record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Document number linking the requirement into its containing doc.
    #[serde(rename = "ReqDocNo", default)]
    pub req_doc_no: Option<String>,
    /// Source descriptor; its `docno` produces a second, distinct doc edge.
    #[serde(default)]
    pub src: Option<SourceRef>,
    #[serde(rename = "Customer", default)]
    pub customer: Option<OneOrMany<CustomerRef>>,
    /// Parent requirement ids; classified against `customer_req`.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Parent ids that are customer requirements rather than plain parents.
    #[serde(default)]
    pub customer_req: Vec<String>,
    #[serde(default)]
    pub srd: Vec<SrdRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How one parent reference of a requirement is to be linked.
///
/// Decided by membership in the record's `customer_req` list; an explicit
/// variant instead of inline branching at edge-creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// `CustomerRequirement -RELATED_TO-> Requirement`
    CustomerRequirement(String),
    /// `Requirement -PARENT_OF-> Requirement`
    Hierarchy(String),
}

impl RequirementRecord {
    /// Classify each parent reference into its link variant.
    pub fn classified_parents(&self) -> Vec<ParentLink> {
        self.parents
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| {
                if self.customer_req.iter().any(|cr| cr == p) {
                    ParentLink::CustomerRequirement(p.clone())
                } else {
                    ParentLink::Hierarchy(p.clone())
                }
            })
            .collect()
    }
}

/// A test case record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestCaseRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Requirement ids this test case verifies. Empty entries are ignored.
    #[serde(default)]
    pub verifies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A test run record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestRunRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(rename = "testCaseId", default)]
    pub test_case_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A generic link record between any two nodes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "sourceId", default)]
    pub source_id: Option<String>,
    #[serde(rename = "targetId", default)]
    pub target_id: Option<String>,
    #[serde(rename = "linkType", default)]
    pub link_type: Option<String>,
}
