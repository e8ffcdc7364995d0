//! Submission orchestrator
//!
//! The entry point UI code calls after the user confirms a mutation:
//! 1. Submit through the executor
//! 2. Confirm the accepted ids with the completion tracker
//! 3. Notify the user and fire exactly one continuation
//!
//! Terminal paths are rejection, confirmed, in progress (budget exhausted)
//! and confirmation failure (feed unreadable). Rejection and confirmation
//! failure fire `on_error`; confirmed fires `on_success`; in progress fires
//! `on_in_progress`, or `on_success` when none was given.

use crate::client::{SubmissionClient, SubmissionExecutor};
use crate::config::RigopsConfig;
use crate::error::{ConfigError, RigopsError};
use crate::normalize::RawIntent;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::queue::{QueuedTransport, RequestQueue};
use crate::tracker::CompletionTracker;
use crate::transport::Transport;
use rigops_action::ActionId;
use std::sync::Arc;

type IdsCallback = Box<dyn FnOnce(&[ActionId]) + Send>;
type ErrorCallback = Box<dyn FnOnce(&RigopsError) + Send>;

/// Caller continuations; consumed by a single orchestrator call
#[derive(Default)]
pub struct Continuations {
    on_success: Option<IdsCallback>,
    on_error: Option<ErrorCallback>,
    on_in_progress: Option<IdsCallback>,
}

impl Continuations {
    /// No-op continuations
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when completion is confirmed (and on timeout without an
    /// in-progress continuation)
    #[must_use]
    pub fn on_success(mut self, f: impl FnOnce(&[ActionId]) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Called on rejection or confirmation failure
    #[must_use]
    pub fn on_error(mut self, f: impl FnOnce(&RigopsError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called when the retry budget ran out before completion was observed
    #[must_use]
    pub fn on_in_progress(mut self, f: impl FnOnce(&[ActionId]) + Send + 'static) -> Self {
        self.on_in_progress = Some(Box::new(f));
        self
    }

    fn succeed(self, ids: &[ActionId]) {
        if let Some(f) = self.on_success {
            f(ids);
        }
    }

    fn still_in_progress(self, ids: &[ActionId]) {
        match (self.on_in_progress, self.on_success) {
            (Some(f), _) | (None, Some(f)) => f(ids),
            (None, None) => {}
        }
    }

    fn fail(self, error: &RigopsError) {
        if let Some(f) = self.on_error {
            f(error);
        }
    }
}

impl std::fmt::Debug for Continuations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuations")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_in_progress", &self.on_in_progress.is_some())
            .finish()
    }
}

/// Terminal outcome of one orchestrated submission
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Accepted and observed as completed
    Confirmed(Vec<ActionId>),
    /// Accepted, completion not observed within the retry budget
    InProgress(Vec<ActionId>),
    /// Rejected, or confirmation could not be read
    Failed {
        /// Ids accepted before the failure; empty for rejections
        action_ids: Vec<ActionId>,
        /// Cause
        error: RigopsError,
    },
}

impl SubmissionOutcome {
    /// Accepted ids
    #[must_use]
    pub fn action_ids(&self) -> &[ActionId] {
        match self {
            Self::Confirmed(ids) | Self::InProgress(ids) => ids,
            Self::Failed { action_ids, .. } => action_ids,
        }
    }

    /// Whether the outcome is a failure
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Convert into a `Result`, treating in-progress as success
    ///
    /// # Errors
    /// Returns the failure cause for [`SubmissionOutcome::Failed`].
    pub fn into_result(self) -> Result<Vec<ActionId>, RigopsError> {
        match self {
            Self::Confirmed(ids) | Self::InProgress(ids) => Ok(ids),
            Self::Failed { error, .. } => Err(error),
        }
    }
}

/// Sequences submission and confirmation
pub struct SubmissionOrchestrator<E, T> {
    executor: E,
    tracker: CompletionTracker<T>,
    notifier: Arc<dyn Notifier>,
}

/// Orchestrator wired through a shared request queue
pub type QueuedOrchestrator<T> =
    SubmissionOrchestrator<SubmissionClient<Arc<QueuedTransport<T>>>, Arc<QueuedTransport<T>>>;

impl<T: Transport> QueuedOrchestrator<T> {
    /// Build client, tracker and request queue around one transport
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `config` fails
    /// [`RigopsConfig::validate`].
    pub fn from_config(
        transport: T,
        config: &RigopsConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let queue = Arc::new(RequestQueue::from_config(&config.transport));
        let transport = Arc::new(QueuedTransport::new(transport, queue, &config.transport));
        Ok(SubmissionOrchestrator::new(
            SubmissionClient::new(Arc::clone(&transport)),
            CompletionTracker::new(transport, config.tracker),
            notifier,
        ))
    }
}

impl<E: SubmissionExecutor, T: Transport> SubmissionOrchestrator<E, T> {
    /// Create orchestrator
    #[inline]
    #[must_use]
    pub fn new(executor: E, tracker: CompletionTracker<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            executor,
            tracker,
            notifier,
        }
    }

    /// Create orchestrator logging notices through `tracing`
    #[inline]
    #[must_use]
    pub fn with_tracing_notifier(executor: E, tracker: CompletionTracker<T>) -> Self {
        Self::new(executor, tracker, Arc::new(TracingNotifier))
    }

    /// Submit `intent`, confirm it and fire one continuation
    pub async fn submit(
        &self,
        intent: RawIntent,
        continuations: Continuations,
    ) -> SubmissionOutcome {
        let result = self.executor.execute(intent).await;

        let data = match result.outcome {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(is_batch = result.is_batch, error = %e, "submission rejected");
                let error = RigopsError::from(e);
                self.notifier.notify(Notice::failed(&error));
                continuations.fail(&error);
                return SubmissionOutcome::Failed {
                    action_ids: Vec::new(),
                    error,
                };
            }
        };

        self.notifier.notify(Notice::submitted());
        let ids = data.action_ids();
        tracing::info!(is_batch = result.is_batch, ids = ?ids, "submission accepted");

        match self.tracker.confirm(&ids).await {
            Ok(true) => {
                self.notifier.notify(Notice::confirmed());
                continuations.succeed(&ids);
                SubmissionOutcome::Confirmed(ids)
            }
            Ok(false) => {
                self.notifier.notify(Notice::in_progress());
                continuations.still_in_progress(&ids);
                SubmissionOutcome::InProgress(ids)
            }
            Err(e) => {
                self.notifier.notify(Notice::unconfirmed(&e));
                let error = RigopsError::from(e);
                continuations.fail(&error);
                SubmissionOutcome::Failed {
                    action_ids: ids,
                    error,
                }
            }
        }
    }
}

impl<E, T> std::fmt::Debug for SubmissionOrchestrator<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionOrchestrator").finish_non_exhaustive()
    }
}
