use proptest::prelude::*;
use rigops_action::{
    miner_delete_payload, ActionKind, Miner, RackId, SparePart, SparePartPolicy, ThingId,
};

fn part_strategy() -> impl Strategy<Value = SparePart> {
    (
        proptest::option::of("[a-z]{1,6}"),
        proptest::option::of("rack-[0-9]{1,2}"),
    )
        .prop_map(|(id, rack)| SparePart {
            id: id.map(|i| ThingId::new(format!("sp-{i}"))),
            rack_id: rack.map(RackId::new),
        })
}

fn policy_strategy() -> impl Strategy<Value = SparePartPolicy> {
    prop_oneof![Just(SparePartPolicy::Unlink), Just(SparePartPolicy::Delete)]
}

proptest! {
    #[test]
    fn prop_parent_is_last_and_parts_keep_order(
        parts in proptest::collection::vec(part_strategy(), 0..12),
        rack in proptest::option::of("rack-[a-z]{1,3}"),
        policy in policy_strategy(),
    ) {
        let miner = Miner::new("miner-1", rack.map(RackId::new)).with_spare_parts(parts.clone());
        let payload = miner_delete_payload(&miner, policy);

        let addressable: Vec<_> = parts
            .iter()
            .filter(|p| p.is_addressable())
            .filter_map(|p| p.id.clone())
            .collect();

        // Invariant: one action per addressable part plus the parent
        prop_assert_eq!(payload.len(), addressable.len() + 1);

        let last = payload.last().unwrap();
        prop_assert_eq!(last.kind(), ActionKind::Forget);
        prop_assert_eq!(last.referenced_ids(), vec![&miner.id]);

        let emitted: Vec<ThingId> = payload[..payload.len() - 1]
            .iter()
            .flat_map(|a| a.referenced_ids().into_iter().cloned())
            .collect();
        prop_assert_eq!(emitted, addressable);
    }

    #[test]
    fn prop_unaddressable_parts_never_emitted(
        parts in proptest::collection::vec(part_strategy(), 0..12),
    ) {
        let miner =
            Miner::new("miner-1", Some(RackId::new("rack-1"))).with_spare_parts(parts.clone());
        let payload = miner_delete_payload(&miner, SparePartPolicy::Unlink);

        for action in &payload[..payload.len() - 1] {
            prop_assert!(action.rack_id.is_some());
        }
    }

    #[test]
    fn prop_rebuild_is_structurally_equal(
        parts in proptest::collection::vec(part_strategy(), 0..8),
        policy in policy_strategy(),
    ) {
        let miner = Miner::new("miner-1", None).with_spare_parts(parts);
        prop_assert_eq!(
            miner_delete_payload(&miner, policy),
            miner_delete_payload(&miner, policy)
        );
    }
}
