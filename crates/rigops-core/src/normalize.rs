//! Intent normalization
//!
//! `enhance` turns a raw intent into an envelope with derived tags;
//! `regroup` splits the envelope into its create and vote directives. The
//! submission client only acts on the create directive.

use rigops_action::{Action, ActionId, BatchDescriptor};
use serde::{Deserialize, Serialize};

/// Vote on an action already in the voting workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDirective {
    /// Action being voted on
    pub action_id: ActionId,
    /// Approve or deny
    pub approve: bool,
}

/// What the caller asked for, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawIntent {
    /// One action
    Action(Action),
    /// An ordered batch
    Batch(BatchDescriptor),
    /// A vote on an existing action
    Vote(VoteDirective),
}

impl From<Action> for RawIntent {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

impl From<BatchDescriptor> for RawIntent {
    fn from(batch: BatchDescriptor) -> Self {
        Self::Batch(batch)
    }
}

/// A new action or batch to create in the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateDirective {
    /// Single action
    Single(Action),
    /// Ordered batch
    Batch(BatchDescriptor),
}

impl CreateDirective {
    /// Whether this goes to the batch endpoint
    #[inline]
    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

/// Normalized envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Envelope {
    /// Create directive
    Create(CreateDirective),
    /// Vote directive
    Vote(VoteDirective),
}

/// Envelope split by directive
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Regrouped {
    /// Create directive, if any
    pub create: Option<CreateDirective>,
    /// Vote directive, if any
    pub vote: Option<VoteDirective>,
}

impl Regrouped {
    /// Short description of the directives present, for diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.create, &self.vote) {
            (Some(c), _) if c.is_batch() => "create(batch)".to_string(),
            (Some(_), _) => "create(single)".to_string(),
            (None, Some(v)) => format!("vote({})", v.action_id),
            (None, None) => "nothing".to_string(),
        }
    }
}

/// Normalization steps the submission client depends on
pub trait Normalizer: Send + Sync {
    /// Turn a raw intent into an envelope
    fn enhance(&self, intent: RawIntent) -> Envelope;

    /// Split an envelope into its directives
    fn regroup(&self, envelope: Envelope) -> Regrouped;
}

/// Default normalizer
///
/// Fills derived tags on every action. An empty batch regroups to no
/// directive at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

impl Normalizer for StandardNormalizer {
    fn enhance(&self, intent: RawIntent) -> Envelope {
        match intent {
            RawIntent::Action(action) => {
                Envelope::Create(CreateDirective::Single(action.with_derived_tags()))
            }
            RawIntent::Batch(mut batch) => {
                batch.ordered_payload = batch
                    .ordered_payload
                    .into_iter()
                    .map(Action::with_derived_tags)
                    .collect();
                Envelope::Create(CreateDirective::Batch(batch))
            }
            RawIntent::Vote(vote) => Envelope::Vote(vote),
        }
    }

    fn regroup(&self, envelope: Envelope) -> Regrouped {
        match envelope {
            Envelope::Create(CreateDirective::Batch(batch)) if batch.is_empty() => {
                Regrouped::default()
            }
            Envelope::Create(create) => Regrouped {
                create: Some(create),
                vote: None,
            },
            Envelope::Vote(vote) => Regrouped {
                create: None,
                vote: Some(vote),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigops_action::{BatchClass, RackId, ThingId};

    #[test]
    fn enhance_fills_tags() {
        let action = Action::forget(Some(RackId::new("rack-1")), ThingId::new("m-1"));
        match StandardNormalizer.enhance(action.into()) {
            Envelope::Create(CreateDirective::Single(a)) => {
                assert!(a.tags.contains("t-forget"));
                assert!(a.tags.contains("id-m-1"));
            }
            other => panic!("unexpected envelope {other:?}"),
        }
    }

    #[test]
    fn enhance_keeps_batch_order_and_id() {
        let batch = BatchDescriptor::new(
            vec![
                Action::forget(None, ThingId::new("a")),
                Action::forget(None, ThingId::new("b")),
            ],
            BatchClass::MinerDelete,
        );
        let id = batch.batch_id;

        let regrouped = StandardNormalizer.regroup(StandardNormalizer.enhance(batch.into()));
        match regrouped.create {
            Some(CreateDirective::Batch(b)) => {
                assert_eq!(b.batch_id, id);
                assert!(b.ordered_payload[0].tags.contains("id-a"));
                assert!(b.ordered_payload[1].tags.contains("id-b"));
            }
            other => panic!("unexpected directive {other:?}"),
        }
    }

    #[test]
    fn vote_has_no_create() {
        let vote = VoteDirective {
            action_id: ActionId(7),
            approve: true,
        };
        let envelope = StandardNormalizer.enhance(RawIntent::Vote(vote));
        let regrouped = StandardNormalizer.regroup(envelope);
        assert!(regrouped.create.is_none());
        assert_eq!(regrouped.describe(), "vote(7)");
    }

    #[test]
    fn empty_batch_has_no_create() {
        let batch = BatchDescriptor::new(vec![], BatchClass::Move);
        let regrouped = StandardNormalizer.regroup(StandardNormalizer.enhance(batch.into()));
        assert_eq!(regrouped, Regrouped::default());
        assert_eq!(regrouped.describe(), "nothing");
    }
}
