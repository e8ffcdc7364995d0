//! Batch descriptors
//!
//! A batch is an ordered list of actions submitted in one call under one
//! correlation id. Order encodes dependency: the backend applies members in
//! array order.

use crate::action::Action;
use crate::ids::BatchId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Audit category of a batch
///
/// Serialized as the batch suffix. Has no effect on execution order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BatchClass {
    /// Miner removal together with its spare parts
    MinerDelete,
    /// Relocation of miners into a container
    Move,
    /// Any other category
    Custom(String),
}

impl BatchClass {
    /// Suffix string sent to the backend
    #[must_use]
    pub fn suffix(&self) -> &str {
        match self {
            BatchClass::MinerDelete => "miner-delete",
            BatchClass::Move => "move",
            BatchClass::Custom(s) => s,
        }
    }
}

impl Display for BatchClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl From<String> for BatchClass {
    fn from(value: String) -> Self {
        match value.as_str() {
            "miner-delete" => BatchClass::MinerDelete,
            "move" => BatchClass::Move,
            _ => BatchClass::Custom(value),
        }
    }
}

impl From<BatchClass> for String {
    fn from(value: BatchClass) -> Self {
        value.suffix().to_string()
    }
}

/// Ordered set of actions applied together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDescriptor {
    /// Correlation id, one per user-initiated operation
    #[serde(rename = "batchActionUID")]
    pub batch_id: BatchId,
    /// Members in dependency order
    #[serde(rename = "batchActionsPayload")]
    pub ordered_payload: Vec<Action>,
    /// Audit category
    #[serde(rename = "suffix")]
    pub class: BatchClass,
}

impl BatchDescriptor {
    /// Create a batch with a freshly minted id
    #[inline]
    #[must_use]
    pub fn new(ordered_payload: Vec<Action>, class: BatchClass) -> Self {
        Self::with_id(BatchId::new(), ordered_payload, class)
    }

    /// Create a batch reusing an existing id (retry of the same operation)
    #[inline]
    #[must_use]
    pub fn with_id(batch_id: BatchId, ordered_payload: Vec<Action>, class: BatchClass) -> Self {
        Self {
            batch_id,
            ordered_payload,
            class,
        }
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered_payload.len()
    }

    /// Whether the batch has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_payload.is_empty()
    }

    /// Iterate members in submission order
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.ordered_payload.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ThingId;

    #[test]
    fn class_round_trips_through_suffix() {
        for class in [
            BatchClass::MinerDelete,
            BatchClass::Move,
            BatchClass::Custom("shipment".into()),
        ] {
            let s: String = class.clone().into();
            assert_eq!(BatchClass::from(s), class);
        }
    }

    #[test]
    fn with_id_keeps_correlation_id() {
        let first = BatchDescriptor::new(
            vec![Action::forget(None, ThingId::new("a"))],
            BatchClass::MinerDelete,
        );
        let retry = BatchDescriptor::with_id(
            first.batch_id,
            first.ordered_payload.clone(),
            first.class.clone(),
        );
        assert_eq!(first, retry);
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let batch = BatchDescriptor::new(vec![], BatchClass::Move);
        let value = serde_json::to_value(&batch).unwrap();
        assert!(value.get("batchActionUID").is_some());
        assert_eq!(value["batchActionsPayload"], serde_json::json!([]));
        assert_eq!(value["suffix"], "move");
    }
}
