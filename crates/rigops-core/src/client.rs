//! Submission client
//!
//! Normalizes one intent, picks the single or batch endpoint and performs
//! exactly one transport call. Failures are captured into the result, never
//! returned as `Err`.

use crate::error::{SubmitError, TransportError};
use crate::normalize::{CreateDirective, Normalizer, RawIntent, StandardNormalizer};
use crate::transport::Transport;
use rigops_action::ActionId;

/// Backend ids of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionData {
    /// Id of the single action
    Single(ActionId),
    /// One id per batch member, in payload order
    Batch(Vec<ActionId>),
}

impl SubmissionData {
    /// Ids the completion tracker has to confirm
    #[must_use]
    pub fn action_ids(&self) -> Vec<ActionId> {
        match self {
            Self::Single(id) => vec![*id],
            Self::Batch(ids) => ids.clone(),
        }
    }
}

/// Uniform result of one submission
///
/// `Ok` means accepted, not done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    /// Whether the batch endpoint was used
    pub is_batch: bool,
    /// Accepted ids or the captured failure
    pub outcome: Result<SubmissionData, SubmitError>,
}

impl SubmissionResult {
    /// Accepted ids, if any
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&SubmissionData> {
        self.outcome.as_ref().ok()
    }

    /// Captured failure, if any
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&SubmitError> {
        self.outcome.as_ref().err()
    }
}

/// Something that can submit an intent and report a uniform result
///
/// Implemented by [`SubmissionClient`]; the orchestrator is generic over it.
#[async_trait::async_trait]
pub trait SubmissionExecutor: Send + Sync {
    /// Submit one intent
    async fn execute(&self, intent: RawIntent) -> SubmissionResult;
}

/// Client dispatching normalized intents to the transport
#[derive(Debug)]
pub struct SubmissionClient<T, N = StandardNormalizer> {
    transport: T,
    normalizer: N,
}

impl<T: Transport> SubmissionClient<T> {
    /// Create client with the standard normalizer
    #[inline]
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_normalizer(transport, StandardNormalizer)
    }
}

impl<T: Transport, N: Normalizer> SubmissionClient<T, N> {
    /// Create client with a custom normalizer
    #[inline]
    #[must_use]
    pub fn with_normalizer(transport: T, normalizer: N) -> Self {
        Self {
            transport,
            normalizer,
        }
    }

    /// Submit one intent
    ///
    /// An intent that regroups without a create directive yields
    /// [`SubmitError::UnknownAction`] without touching the transport.
    pub async fn submit(&self, intent: RawIntent) -> SubmissionResult {
        let envelope = self.normalizer.enhance(intent);
        let regrouped = self.normalizer.regroup(envelope);

        let Some(create) = regrouped.create else {
            let found = regrouped.describe();
            tracing::error!(%found, "normalized intent has no create directive");
            return SubmissionResult {
                is_batch: false,
                outcome: Err(SubmitError::UnknownAction { found }),
            };
        };

        match create {
            CreateDirective::Single(action) => {
                tracing::info!(kind = %action.kind(), rack = ?action.rack_id, "submitting action");
                let outcome = self
                    .transport
                    .submit_single_action(&action)
                    .await
                    .map(|ack| SubmissionData::Single(ack.id))
                    .map_err(SubmitError::from);
                SubmissionResult {
                    is_batch: false,
                    outcome,
                }
            }
            CreateDirective::Batch(batch) => {
                tracing::info!(
                    batch_id = %batch.batch_id,
                    class = %batch.class,
                    members = batch.len(),
                    "submitting batch"
                );
                let outcome = self
                    .transport
                    .submit_batch_action(&batch)
                    .await
                    .and_then(|acks| {
                        if acks.len() == batch.len() {
                            Ok(SubmissionData::Batch(acks.into_iter().map(|a| a.id).collect()))
                        } else {
                            tracing::error!(
                                batch_id = %batch.batch_id,
                                expected = batch.len(),
                                got = acks.len(),
                                "batch ack count differs from payload"
                            );
                            Err(TransportError::Decode(format!(
                                "expected {} batch acks, got {}",
                                batch.len(),
                                acks.len()
                            )))
                        }
                    })
                    .map_err(SubmitError::from);
                SubmissionResult {
                    is_batch: true,
                    outcome,
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport, N: Normalizer> SubmissionExecutor for SubmissionClient<T, N> {
    async fn execute(&self, intent: RawIntent) -> SubmissionResult {
        self.submit(intent).await
    }
}
