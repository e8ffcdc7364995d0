//! Canonical action records
//!
//! An [`Action`] is one mutation request for the voting workflow. The
//! operation is a tagged union per kind so each variant carries only the
//! payload it needs.

use crate::ids::{RackId, ThingId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Free-form record fields sent with register/update operations
pub type Info = Map<String, Value>;

/// Closed set of action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// Create a new record
    Register,
    /// Modify fields of an existing record
    Update,
    /// Delete a record
    Forget,
}

impl ActionKind {
    /// Short lowercase name, used in tags and logs
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Register => "register",
            ActionKind::Update => "update",
            ActionKind::Forget => "forget",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a register operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParams {
    /// Client-chosen id; the backend assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ThingId>,
    /// Record fields
    #[serde(default)]
    pub info: Info,
    /// Record-level tags stored with the thing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Payload of an update operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateParams {
    /// Record to update
    pub id: ThingId,
    /// Fields to set; `null` clears a field
    #[serde(default)]
    pub info: Info,
}

/// Selector for a forget operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingQuery {
    /// Record to delete
    pub id: ThingId,
}

/// Payload of a forget operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgetParams {
    /// Records matched by this query are deleted
    pub query: ThingQuery,
}

/// Operation and its ordered parameter sets
///
/// The backend accepts several parameter sets per action; the builders in
/// this crate always emit exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params")]
pub enum Operation {
    /// Register new records
    #[serde(rename = "registerThing")]
    Register(Vec<RegisterParams>),
    /// Update existing records
    #[serde(rename = "updateThing")]
    Update(Vec<UpdateParams>),
    /// Delete records
    #[serde(rename = "forgetThings")]
    Forget(Vec<ForgetParams>),
}

impl Operation {
    /// Kind of this operation
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Operation::Register(_) => ActionKind::Register,
            Operation::Update(_) => ActionKind::Update,
            Operation::Forget(_) => ActionKind::Forget,
        }
    }

    /// Number of parameter sets
    #[inline]
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Operation::Register(p) => p.len(),
            Operation::Update(p) => p.len(),
            Operation::Forget(p) => p.len(),
        }
    }
}

/// A single mutation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Backend collection the mutation applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_id: Option<RackId>,
    /// What to do
    #[serde(flatten)]
    pub operation: Operation,
    /// Audit/search tags derived from the content
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Client-side bookkeeping id; never sent to the backend
    #[serde(skip)]
    pub correlation_id: Option<String>,
}

impl Action {
    /// Create an action from an operation
    #[inline]
    #[must_use]
    pub fn new(rack_id: Option<RackId>, operation: Operation) -> Self {
        Self {
            rack_id,
            operation,
            tags: BTreeSet::new(),
            correlation_id: None,
        }
    }

    /// Register action with a single parameter set
    #[must_use]
    pub fn register(rack_id: RackId, params: RegisterParams) -> Self {
        Self::new(Some(rack_id), Operation::Register(vec![params]))
    }

    /// Update action with a single parameter set
    #[must_use]
    pub fn update(rack_id: Option<RackId>, id: ThingId, info: Info) -> Self {
        Self::new(rack_id, Operation::Update(vec![UpdateParams { id, info }]))
    }

    /// Forget action deleting a single record
    #[must_use]
    pub fn forget(rack_id: Option<RackId>, id: ThingId) -> Self {
        Self::new(
            rack_id,
            Operation::Forget(vec![ForgetParams {
                query: ThingQuery { id },
            }]),
        )
    }

    /// With correlation id
    #[inline]
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Kind of the wrapped operation
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.operation.kind()
    }

    /// Ids of every record this action references, in parameter order
    #[must_use]
    pub fn referenced_ids(&self) -> Vec<&ThingId> {
        match &self.operation {
            Operation::Register(params) => params.iter().filter_map(|p| p.id.as_ref()).collect(),
            Operation::Update(params) => params.iter().map(|p| &p.id).collect(),
            Operation::Forget(params) => params.iter().map(|p| &p.query.id).collect(),
        }
    }
}
