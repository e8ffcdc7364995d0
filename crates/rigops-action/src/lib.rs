//! rigops Action Model
//!
//! Typed mutation requests for the asset voting workflow.
//!
//! # Core Concepts
//!
//! - [`Action`]: one mutation, a tagged union over register/update/forget
//! - [`BatchDescriptor`]: ordered actions applied together under one id
//! - [`derive_tags`]: deterministic audit tags for an action
//! - [`builder`]: pure envelope builders (miner delete, container move, ...)
//!
//! # Example
//!
//! ```rust
//! use rigops_action::{build_delete_miner_batch, Miner, RackId, SparePart, SparePartPolicy};
//!
//! let miner = Miner::new("miner-123", Some(RackId::new("rack-abc")))
//!     .with_spare_parts(vec![SparePart::new("sp-1", "rack-1")]);
//!
//! let batch = build_delete_miner_batch(&miner, SparePartPolicy::Unlink);
//! assert_eq!(batch.len(), 2);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod action;
mod batch;
mod ids;
mod model;
mod tags;

pub mod builder;

// Re-exports
pub use action::{
    Action, ActionKind, ForgetParams, Info, Operation, RegisterParams, ThingQuery, UpdateParams,
};
pub use batch::{BatchClass, BatchDescriptor};
pub use builder::{
    attach_spare_part, build_delete_miner_batch, build_move_to_container_batch, forget_thing,
    miner_delete_payload, move_to_container_payload, register_thing, spare_part_action,
    update_thing, BuildError, SparePartPolicy, PARENT_DEVICE_FIELDS,
};
pub use ids::{ActionId, BatchId, RackId, ThingId};
pub use model::{Miner, SparePart};
pub use tags::derive_tags;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn built_batch_serializes_in_payload_order() {
        let miner = Miner::new("miner-123", Some(RackId::new("rack-abc")))
            .with_spare_parts(vec![SparePart::new("sp-1", "rack-1")]);
        let batch = build_delete_miner_batch(&miner, SparePartPolicy::Delete);

        let value = serde_json::to_value(&batch).unwrap();
        let payload = value["batchActionsPayload"].as_array().unwrap();
        assert_eq!(payload[0]["params"][0]["query"]["id"], "sp-1");
        assert_eq!(payload[1]["params"][0]["query"]["id"], "miner-123");
        assert_eq!(value["suffix"], "miner-delete");
    }
}
