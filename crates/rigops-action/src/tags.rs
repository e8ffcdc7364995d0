//! Audit/search tag derivation
//!
//! Tags are a pure function of the action content: the same action always
//! yields the same tag set.

use crate::action::{Action, Operation};
use serde_json::Value;
use std::collections::BTreeSet;

/// Derive the tag set for an action
///
/// - `t-<kind>` for the operation kind
/// - `rack-<rackId>` when a rack is set
/// - `id-<thingId>` for every referenced record
/// - `code-<code>` for every string `code` field in register/update info
/// - record-level tags of register params, verbatim
#[must_use]
pub fn derive_tags(action: &Action) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(format!("t-{}", action.kind()));

    if let Some(rack) = &action.rack_id {
        tags.insert(format!("rack-{rack}"));
    }

    for id in action.referenced_ids() {
        tags.insert(format!("id-{id}"));
    }

    match &action.operation {
        Operation::Register(params) => {
            for p in params {
                if let Some(Value::String(code)) = p.info.get("code") {
                    tags.insert(format!("code-{code}"));
                }
                tags.extend(p.tags.iter().cloned());
            }
        }
        Operation::Update(params) => {
            for p in params {
                if let Some(Value::String(code)) = p.info.get("code") {
                    tags.insert(format!("code-{code}"));
                }
            }
        }
        Operation::Forget(_) => {}
    }

    tags
}

impl Action {
    /// Replace the tag set with the derived tags
    #[must_use]
    pub fn with_derived_tags(mut self) -> Self {
        self.tags = derive_tags(&self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Info, RegisterParams};
    use crate::ids::{RackId, ThingId};
    use serde_json::json;

    #[test]
    fn forget_tags() {
        let action = Action::forget(Some(RackId::new("rack-abc")), ThingId::new("miner-123"));
        let tags: Vec<_> = derive_tags(&action).into_iter().collect();
        assert_eq!(tags, vec!["id-miner-123", "rack-rack-abc", "t-forget"]);
    }

    #[test]
    fn register_tags_include_code_and_record_tags() {
        let mut info = Info::new();
        info.insert("code".into(), json!("M-0042"));
        let action = Action::register(
            RackId::new("rack-1"),
            RegisterParams {
                id: None,
                info,
                tags: vec!["site-a".into()],
            },
        );

        let tags = derive_tags(&action);
        assert!(tags.contains("code-M-0042"));
        assert!(tags.contains("site-a"));
        assert!(tags.contains("t-register"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let action = Action::update(None, ThingId::new("sp-1"), Info::new());
        assert_eq!(derive_tags(&action), derive_tags(&action.clone()));
        assert_eq!(action.with_derived_tags().tags.len(), 2);
    }
}
