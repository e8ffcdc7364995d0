//! Action envelope builders
//!
//! Pure functions translating one domain intent into ready-to-submit
//! actions. No I/O; identical inputs give structurally equal actions. Only
//! the batch id of a freshly built [`BatchDescriptor`] varies between calls.
//!
//! # Ordering
//!
//! Multi-record operations emit every sub-record action first, in input
//! order, followed by exactly one parent action. The backend applies batch
//! members sequentially, so a part must be unlinked or removed before its
//! owning device disappears.

use crate::action::{Action, Info, RegisterParams};
use crate::batch::{BatchClass, BatchDescriptor};
use crate::ids::{RackId, ThingId};
use crate::model::{Miner, SparePart};
use serde_json::Value;

/// Fields on a spare part linking it to the device it is mounted in
pub const PARENT_DEVICE_FIELDS: [&str; 5] = [
    "parentDeviceId",
    "parentDeviceCode",
    "parentDeviceRack",
    "parentDeviceType",
    "parentDeviceSN",
];

/// What happens to a miner's spare parts when the miner is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SparePartPolicy {
    /// Keep the parts and clear their parent-device fields
    #[default]
    Unlink,
    /// Delete the parts along with the miner
    Delete,
}

/// Builder errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A record that must be addressed has no id
    #[error("{what} has no id")]
    MissingId {
        /// Record description
        what: &'static str,
    },

    /// A record that must be addressed has no rack
    #[error("{what} {id} has no rack")]
    MissingRack {
        /// Record description
        what: &'static str,
        /// Record id
        id: ThingId,
    },
}

/// Register a new thing in `rack_id`
#[must_use]
pub fn register_thing(rack_id: RackId, id: Option<ThingId>, info: Info) -> Action {
    let correlation = id.as_ref().map(ToString::to_string);
    let action = Action::register(
        rack_id,
        RegisterParams {
            id,
            info,
            tags: Vec::new(),
        },
    );
    match correlation {
        Some(c) => action.with_correlation_id(c),
        None => action,
    }
}

/// Update fields of an existing thing
#[must_use]
pub fn update_thing(rack_id: Option<RackId>, id: ThingId, info: Info) -> Action {
    let correlation = id.to_string();
    Action::update(rack_id, id, info).with_correlation_id(correlation)
}

/// Delete an existing thing
#[must_use]
pub fn forget_thing(rack_id: Option<RackId>, id: ThingId) -> Action {
    let correlation = id.to_string();
    Action::forget(rack_id, id).with_correlation_id(correlation)
}

/// Action for one spare part of a miner being deleted
///
/// Returns `None` when the part lacks an id or a rack: such a part cannot be
/// addressed and is left out rather than producing a malformed action.
#[must_use]
pub fn spare_part_action(part: &SparePart, policy: SparePartPolicy) -> Option<Action> {
    let (id, rack) = match (&part.id, &part.rack_id) {
        (Some(id), Some(rack)) => (id.clone(), rack.clone()),
        _ => return None,
    };

    let action = match policy {
        SparePartPolicy::Delete => forget_thing(Some(rack), id),
        SparePartPolicy::Unlink => update_thing(Some(rack), id, cleared_parent_fields()),
    };
    Some(action)
}

/// Ordered payload for deleting a miner
///
/// Spare-part actions come first in input order; the miner forget is last.
/// A miner without a rack still yields its forget action, with no rack set.
#[must_use]
pub fn miner_delete_payload(miner: &Miner, policy: SparePartPolicy) -> Vec<Action> {
    let mut payload: Vec<Action> = miner
        .spare_parts
        .iter()
        .filter_map(|part| spare_part_action(part, policy))
        .collect();

    payload.push(forget_thing(miner.rack_id.clone(), miner.id.clone()));
    payload
}

/// Batch deleting a miner and unlinking or deleting its spare parts
#[must_use]
pub fn build_delete_miner_batch(miner: &Miner, policy: SparePartPolicy) -> BatchDescriptor {
    BatchDescriptor::new(miner_delete_payload(miner, policy), BatchClass::MinerDelete)
}

/// Link a spare part to a miner by setting its parent-device fields
///
/// # Errors
/// Returns [`BuildError`] if the part has no id or no rack.
pub fn attach_spare_part(part: &SparePart, miner: &Miner) -> Result<Action, BuildError> {
    let id = part
        .id
        .clone()
        .ok_or(BuildError::MissingId { what: "spare part" })?;
    let rack = part.rack_id.clone().ok_or_else(|| BuildError::MissingRack {
        what: "spare part",
        id: id.clone(),
    })?;

    let mut info = Info::new();
    info.insert("parentDeviceId".into(), Value::String(miner.id.to_string()));
    info.insert(
        "parentDeviceCode".into(),
        miner.code.clone().map_or(Value::Null, Value::String),
    );
    info.insert(
        "parentDeviceRack".into(),
        miner
            .rack_id
            .as_ref()
            .map_or(Value::Null, |r| Value::String(r.to_string())),
    );

    Ok(update_thing(Some(rack), id, info))
}

/// One update per miner moving it into `container`
///
/// Miners without a rack are left out.
#[must_use]
pub fn move_to_container_payload(miners: &[Miner], container: &str) -> Vec<Action> {
    miners
        .iter()
        .filter_map(|miner| {
            let rack = miner.rack_id.clone()?;
            let mut info = Info::new();
            info.insert("container".into(), Value::String(container.to_string()));
            Some(update_thing(Some(rack), miner.id.clone(), info))
        })
        .collect()
}

/// Batch moving miners into a container
#[must_use]
pub fn build_move_to_container_batch(miners: &[Miner], container: &str) -> BatchDescriptor {
    BatchDescriptor::new(move_to_container_payload(miners, container), BatchClass::Move)
}

fn cleared_parent_fields() -> Info {
    PARENT_DEVICE_FIELDS
        .iter()
        .map(|field| ((*field).to_string(), Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, Operation};
    use pretty_assertions::assert_eq;

    fn miner_with_part() -> Miner {
        Miner::new("miner-123", Some(RackId::new("rack-abc")))
            .with_spare_parts(vec![SparePart::new("sp-1", "rack-1")])
    }

    #[test]
    fn unlink_batch_clears_parent_fields_then_forgets_miner() {
        let batch = build_delete_miner_batch(&miner_with_part(), SparePartPolicy::Unlink);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.class, BatchClass::MinerDelete);

        let part = &batch.ordered_payload[0];
        assert_eq!(part.kind(), ActionKind::Update);
        assert_eq!(part.rack_id, Some(RackId::new("rack-1")));
        match &part.operation {
            Operation::Update(params) => {
                assert_eq!(params.len(), 1);
                assert_eq!(params[0].id, ThingId::new("sp-1"));
                for field in PARENT_DEVICE_FIELDS {
                    assert_eq!(params[0].info.get(field), Some(&Value::Null));
                }
            }
            other => panic!("expected update, got {other:?}"),
        }

        let miner = &batch.ordered_payload[1];
        assert_eq!(miner.kind(), ActionKind::Forget);
        assert_eq!(miner.rack_id, Some(RackId::new("rack-abc")));
        assert_eq!(
            serde_json::to_value(&miner.operation).unwrap()["params"][0]["query"],
            serde_json::json!({ "id": "miner-123" })
        );
        assert_eq!(miner.correlation_id.as_deref(), Some("miner-123"));
    }

    #[test]
    fn delete_policy_forgets_parts() {
        let payload = miner_delete_payload(&miner_with_part(), SparePartPolicy::Delete);
        assert_eq!(payload[0].kind(), ActionKind::Forget);
        assert_eq!(payload[0].referenced_ids(), vec![&ThingId::new("sp-1")]);
    }

    #[test]
    fn unaddressable_parts_are_skipped() {
        let miner = Miner::new("m-1", Some(RackId::new("r")))
            .with_spare_parts(vec![
                SparePart {
                    id: Some(ThingId::new("no-rack")),
                    rack_id: None,
                },
                SparePart::new("ok", "rack-1"),
                SparePart {
                    id: None,
                    rack_id: Some(RackId::new("rack-1")),
                },
                SparePart::default(),
            ]);

        let payload = miner_delete_payload(&miner, SparePartPolicy::Unlink);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].referenced_ids(), vec![&ThingId::new("ok")]);
    }

    #[test]
    fn miner_without_rack_still_emits_forget() {
        let payload = miner_delete_payload(&Miner::from("m-orphan"), SparePartPolicy::Unlink);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].rack_id, None);
        assert_eq!(payload[0].kind(), ActionKind::Forget);
    }

    #[test]
    fn rebuild_is_structurally_equal() {
        let miner = miner_with_part();
        let a = build_delete_miner_batch(&miner, SparePartPolicy::Unlink);
        let b = build_delete_miner_batch(&miner, SparePartPolicy::Unlink);
        assert_eq!(a.ordered_payload, b.ordered_payload);
        assert_ne!(a.batch_id, b.batch_id);
    }

    #[test]
    fn attach_requires_addressable_part() {
        let miner = miner_with_part().with_code("M-7");
        let err = attach_spare_part(&SparePart::default(), &miner).unwrap_err();
        assert_eq!(err, BuildError::MissingId { what: "spare part" });

        let action = attach_spare_part(&SparePart::new("sp-9", "rack-1"), &miner).unwrap();
        match action.operation {
            Operation::Update(params) => {
                assert_eq!(params[0].info["parentDeviceId"], "miner-123");
                assert_eq!(params[0].info["parentDeviceCode"], "M-7");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn move_skips_miners_without_rack() {
        let miners = vec![
            Miner::new("a", Some(RackId::new("rack-1"))),
            Miner::from("b"),
            Miner::new("c", Some(RackId::new("rack-1"))),
        ];
        let batch = build_move_to_container_batch(&miners, "container-7");
        assert_eq!(batch.class, BatchClass::Move);
        let ids: Vec<_> = batch
            .iter()
            .flat_map(|a| a.referenced_ids())
            .map(ThingId::as_str)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn register_correlates_on_caller_supplied_id() {
        let named = register_thing(RackId::new("rack-1"), Some(ThingId::new("sp-9")), Info::new());
        assert_eq!(named.kind(), ActionKind::Register);
        assert_eq!(named.rack_id, Some(RackId::new("rack-1")));
        assert_eq!(named.correlation_id.as_deref(), Some("sp-9"));
        assert_eq!(named.referenced_ids(), vec![&ThingId::new("sp-9")]);

        let anonymous = register_thing(RackId::new("rack-1"), None, Info::new());
        assert_eq!(anonymous.kind(), ActionKind::Register);
        assert_eq!(anonymous.correlation_id, None);
        assert!(anonymous.referenced_ids().is_empty());
    }
}
