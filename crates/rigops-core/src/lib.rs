//! rigops Core - action submission and completion tracking
//!
//! The client-side core behind physical-asset mutations:
//! - Submits single actions and ordered batches through a [`Transport`]
//! - Confirms completion with a bounded poll of the recently-completed feed
//! - Fires exactly one terminal continuation per submission
//! - Hides removed records optimistically and restores them on failure
//!
//! # Example
//!
//! ```rust,ignore
//! use rigops_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     transport: impl Transport + 'static,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RigopsConfig::new();
//! let orchestrator =
//!     QueuedOrchestrator::from_config(transport, &config, Arc::new(TracingNotifier))?;
//!
//! let miner = Miner::new("miner-123", Some(RackId::new("rack-abc")));
//! let list = Arc::new(OptimisticReconciler::new(vec![miner.clone()]));
//! list.remove_optimistically(&miner.id)?;
//!
//! let batch = build_delete_miner_batch(&miner, SparePartPolicy::Unlink);
//! let outcome = orchestrator
//!     .submit(batch.into(), list.continuations(miner.id.clone()))
//!     .await;
//! println!("{} action(s) accepted", outcome.action_ids().len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod notify;
pub mod orchestrator;
pub mod queue;
pub mod reconciler;
pub mod telemetry;
pub mod tracker;
pub mod transport;

// Re-exports for convenience
pub use cache::OptimisticCache;
pub use client::{SubmissionClient, SubmissionData, SubmissionExecutor, SubmissionResult};
pub use config::{RigopsConfig, TelemetryConfig, TrackerConfig, TransportConfig};
pub use error::{
    ConfigError, ReconcileError, RigopsError, SubmitError, TrackerError, TransportError,
};
pub use normalize::{
    CreateDirective, Envelope, Normalizer, RawIntent, Regrouped, StandardNormalizer,
    VoteDirective,
};
pub use notify::{Notice, NoticeKind, Notifier, TracingNotifier};
pub use orchestrator::{
    Continuations, QueuedOrchestrator, SubmissionOrchestrator, SubmissionOutcome,
};
pub use queue::{QueuedTransport, RequestQueue, Route};
pub use reconciler::{ListRecord, OptimisticReconciler};
pub use telemetry::init_tracing;
pub use tracker::{CompletionTracker, PollStatus};
pub use transport::{
    CompletedFeed, CompletionRecord, CompletionStatus, FeedQuery, SubmitAck, Transport,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring submissions from UI handlers
    pub use crate::{
        CompletionTracker, Continuations, OptimisticReconciler, QueuedOrchestrator, RawIntent,
        RigopsConfig, RigopsError, SubmissionClient, SubmissionOrchestrator, SubmissionOutcome,
        TracingNotifier, Transport,
    };
    pub use rigops_action::{
        build_delete_miner_batch, build_move_to_container_batch, Action, ActionId,
        BatchDescriptor, Miner, RackId, SparePart, SparePartPolicy, ThingId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
