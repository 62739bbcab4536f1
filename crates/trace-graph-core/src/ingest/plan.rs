//! Record-to-operation planning.
//!
//! Each planner turns one validated record into the ordered list of
//! [`GraphOp`]s that realize it. Planning is pure: no backend is touched,
//! so every schema rule here is unit-testable.

use serde_json::{Map, Value};

use crate::error::{Result, TraceGraphError};
use crate::records::{
    CustomerRef, LinkRecord, ParentLink, RequirementRecord, SrdRecord, TestCaseRecord,
    TestRunRecord,
};
use crate::types::{scalar_props, EntityKind, GraphOp, NodeRef, RelKind, RelType};

fn require_id(id: &Option<String>, what: &str) -> Result<String> {
    match id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(TraceGraphError::validation(format!("{what} record missing id"))),
    }
}

/// Node property map: named scalar fields plus the storable part of the
/// record's extra fields. Relationship-bearing fields are represented as
/// edges only, never duplicated as properties.
fn node_props(named: &[(&str, &Option<String>)], extra: &Map<String, Value>) -> Map<String, Value> {
    let mut props = scalar_props(extra);
    for (key, value) in named {
        if let Some(v) = value {
            props.insert((*key).to_string(), Value::String(v.clone()));
        }
    }
    props
}

/// Plan one requirement record.
pub fn plan_requirement(rec: &RequirementRecord) -> Result<Vec<GraphOp>> {
    let req_id = require_id(&rec.id, "requirement")?;
    let req = |id: &str| NodeRef::new(EntityKind::Requirement, id);

    let mut props = node_props(&[("title", &rec.title), ("text", &rec.text)], &rec.extra);
    props.insert("id".to_string(), Value::String(req_id.clone()));

    let mut ops = vec![GraphOp::MergeNode {
        kind: EntityKind::Requirement,
        id: req_id.clone(),
        props,
    }];

    // Containing document via the ReqDocNo field.
    if let Some(doc_id) = rec.req_doc_no.as_deref().filter(|s| !s.is_empty()) {
        ops.push(GraphOp::Edge {
            from: NodeRef::new(EntityKind::ReqDoc, doc_id),
            rel: RelKind::Contains,
            to: req(&req_id),
        });
    }

    // Referring document via the nested src.docno field. Both edges are
    // produced when both fields are present.
    if let Some(docno) = rec.src.as_ref().and_then(|s| s.docno()) {
        ops.push(GraphOp::Edge {
            from: NodeRef::new(EntityKind::ReqDoc, docno),
            rel: RelKind::RefersRequirement,
            to: req(&req_id),
        });
    }

    // Customers: single or list, object or scalar. References without a
    // usable id are skipped.
    if let Some(customers) = &rec.customer {
        for cust in customers.iter() {
            let Some((cust_id, cust_name)) = cust.resolve() else {
                tracing::warn!(requirement = %req_id, "skipping customer reference without id");
                continue;
            };
            let mut cust_props = Map::new();
            if let Some(name) = cust_name {
                cust_props.insert("name".to_string(), Value::String(name));
            }
            ops.push(GraphOp::MergeNode {
                kind: EntityKind::Customer,
                id: cust_id.clone(),
                props: cust_props,
            });
            ops.push(GraphOp::Edge {
                from: NodeRef::new(EntityKind::Customer, cust_id),
                rel: RelKind::UsesRequirement,
                to: req(&req_id),
            });
        }
    }

    // Parents, pre-classified into customer-requirement relations vs the
    // plain requirement hierarchy.
    for parent in rec.classified_parents() {
        match parent {
            ParentLink::CustomerRequirement(id) => ops.push(GraphOp::Edge {
                from: NodeRef::new(EntityKind::CustomerRequirement, id),
                rel: RelKind::RelatedTo,
                to: req(&req_id),
            }),
            ParentLink::Hierarchy(id) => ops.push(GraphOp::Edge {
                from: NodeRef::new(EntityKind::Requirement, id),
                rel: RelKind::ParentOf,
                to: req(&req_id),
            }),
        }
    }

    for srd in &rec.srd {
        ops.extend(plan_srd_item(&req_id, srd));
    }

    Ok(ops)
}

/// Plan one item of a requirement's `srd` array: a doc-membership edge when
/// the item carries its own `no`, and always an `Srd` node associated with
/// the requirement (falling back to the synthesized id).
fn plan_srd_item(req_id: &str, srd: &SrdRecord) -> Vec<GraphOp> {
    let mut ops = Vec::new();

    if let Some(no) = srd.no.as_deref().filter(|s| !s.is_empty()) {
        ops.push(GraphOp::Edge {
            from: NodeRef::new(EntityKind::Requirement, req_id),
            rel: RelKind::BelongsToDoc,
            to: NodeRef::new(EntityKind::ReqDoc, no),
        });
    }

    let srd_id = srd.effective_id(req_id);
    let mut props = scalar_props(&srd.extra);
    if let Some(no) = &srd.no {
        props.insert("no".to_string(), Value::String(no.clone()));
    }
    ops.push(GraphOp::MergeNode { kind: EntityKind::Srd, id: srd_id.clone(), props });
    ops.push(GraphOp::Edge {
        from: NodeRef::new(EntityKind::Srd, srd_id),
        rel: RelKind::AssociatedWith,
        to: NodeRef::new(EntityKind::Requirement, req_id),
    });

    ops
}

/// Plan one test case record.
///
/// `VERIFIED_BY` edges are strict-match: a verified requirement that does
/// not exist yields no edge and no error.
pub fn plan_test_case(rec: &TestCaseRecord) -> Result<Vec<GraphOp>> {
    let tc_id = require_id(&rec.id, "test case")?;

    let mut props =
        node_props(&[("name", &rec.name), ("description", &rec.description)], &rec.extra);
    props.insert("id".to_string(), Value::String(tc_id.clone()));

    let mut ops =
        vec![GraphOp::MergeNode { kind: EntityKind::TestCase, id: tc_id.clone(), props }];

    for req_id in rec.verifies.iter().filter(|v| !v.is_empty()) {
        ops.push(GraphOp::Edge {
            from: NodeRef::new(EntityKind::Requirement, req_id),
            rel: RelKind::VerifiedBy,
            to: NodeRef::new(EntityKind::TestCase, &tc_id),
        });
    }

    Ok(ops)
}

/// Plan one test run record. `EXECUTED_IN` is strict-match, like
/// `VERIFIED_BY`.
pub fn plan_test_run(rec: &TestRunRecord) -> Result<Vec<GraphOp>> {
    let tr_id = require_id(&rec.id, "test run")?;

    let mut props = node_props(&[("status", &rec.status), ("log", &rec.log)], &rec.extra);
    props.insert("id".to_string(), Value::String(tr_id.clone()));

    let mut ops =
        vec![GraphOp::MergeNode { kind: EntityKind::TestRun, id: tr_id.clone(), props }];

    if let Some(tc_id) = rec.test_case_id.as_deref().filter(|s| !s.is_empty()) {
        ops.push(GraphOp::Edge {
            from: NodeRef::new(EntityKind::TestCase, tc_id),
            rel: RelKind::ExecutedIn,
            to: NodeRef::new(EntityKind::TestRun, &tr_id),
        });
    }

    Ok(ops)
}

/// Plan one generic link record.
///
/// Returns `None` when either endpoint id is absent or empty (the record is
/// ignored). A link type that fails the identifier check is a validation
/// error and never reaches query construction.
pub fn plan_link(rec: &LinkRecord) -> Result<Option<GraphOp>> {
    let source = rec.source_id.as_deref().map(str::trim).unwrap_or_default();
    let target = rec.target_id.as_deref().map(str::trim).unwrap_or_default();
    if source.is_empty() || target.is_empty() {
        return Ok(None);
    }

    let rel = match &rec.link_type {
        Some(raw) => RelType::parse(raw)?,
        None => RelType::links_to(),
    };

    Ok(Some(GraphOp::LinkAny {
        source_id: source.to_string(),
        target_id: target.to_string(),
        rel,
    }))
}
