//! Testing utilities for rigops workspace
//!
//! Shared test helpers, fixtures, and assertions.

#![allow(missing_docs)]

use parking_lot::Mutex;
use rigops_action::{Action, ActionId, BatchDescriptor, Miner, RackId, SparePart};
use rigops_core::{
    CompletedFeed, CompletionRecord, Continuations, FeedQuery, Notice, NoticeKind, Notifier,
    RigopsConfig, SubmitAck, Transport, TransportError,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory backend with scripted feed responses
///
/// Submissions are acked with sequential ids. Each feed query consumes the
/// next scripted response; once the script runs out the last scripted feed
/// repeats (or, with [`ScriptedTransport::completing_everything`], every
/// acked id is reported completed).
#[derive(Debug)]
pub struct ScriptedTransport {
    next_id: AtomicU64,
    acked: Mutex<Vec<ActionId>>,
    submit_errors: Mutex<VecDeque<TransportError>>,
    feeds: Mutex<VecDeque<Result<CompletedFeed, TransportError>>>,
    last_feed: Mutex<CompletedFeed>,
    auto_complete: AtomicBool,
    singles: Mutex<Vec<Action>>,
    batches: Mutex<Vec<BatchDescriptor>>,
    feed_queries: Mutex<Vec<FeedQuery>>,
    submit_calls: AtomicUsize,
    batch_ack_limit: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Ack ids start at `first_id`
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
            acked: Mutex::new(Vec::new()),
            submit_errors: Mutex::new(VecDeque::new()),
            feeds: Mutex::new(VecDeque::new()),
            last_feed: Mutex::new(CompletedFeed::default()),
            auto_complete: AtomicBool::new(false),
            singles: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            feed_queries: Mutex::new(Vec::new()),
            submit_calls: AtomicUsize::new(0),
            batch_ack_limit: AtomicUsize::new(usize::MAX),
        }
    }

    /// Script a feed containing `ids` as completed
    #[must_use]
    pub fn with_feed(self, ids: &[u64]) -> Self {
        let feed = CompletedFeed {
            done: ids.iter().map(|&id| CompletionRecord::completed(id)).collect(),
        };
        self.feeds.lock().push_back(Ok(feed));
        self
    }

    /// Script a failing feed query
    #[must_use]
    pub fn with_feed_error(self, error: TransportError) -> Self {
        self.feeds.lock().push_back(Err(error));
        self
    }

    /// Fail the next submission with `error`
    #[must_use]
    pub fn with_submit_error(self, error: TransportError) -> Self {
        self.submit_errors.lock().push_back(error);
        self
    }

    /// Ack at most `limit` members of each batch
    #[must_use]
    pub fn with_batch_ack_limit(self, limit: usize) -> Self {
        self.batch_ack_limit.store(limit, Ordering::SeqCst);
        self
    }

    /// Once the script runs out, report every acked id as completed
    #[must_use]
    pub fn completing_everything(self) -> Self {
        self.auto_complete.store(true, Ordering::SeqCst);
        self
    }

    /// Single actions received, in call order
    pub fn submitted_actions(&self) -> Vec<Action> {
        self.singles.lock().clone()
    }

    /// Batches received, in call order
    pub fn submitted_batches(&self) -> Vec<BatchDescriptor> {
        self.batches.lock().clone()
    }

    /// Submission calls, single and batch
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Feed queries received
    pub fn feed_calls(&self) -> usize {
        self.feed_queries.lock().len()
    }

    /// Feed queries received, in call order
    pub fn feed_queries(&self) -> Vec<FeedQuery> {
        self.feed_queries.lock().clone()
    }

    fn begin_submit(&self) -> Result<(), TransportError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match self.submit_errors.lock().pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn ack(&self) -> SubmitAck {
        let id = ActionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.acked.lock().push(id);
        SubmitAck { id }
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn submit_single_action(&self, action: &Action) -> Result<SubmitAck, TransportError> {
        self.singles.lock().push(action.clone());
        self.begin_submit()?;
        Ok(self.ack())
    }

    async fn submit_batch_action(
        &self,
        batch: &BatchDescriptor,
    ) -> Result<Vec<SubmitAck>, TransportError> {
        self.batches.lock().push(batch.clone());
        self.begin_submit()?;
        let limit = self.batch_ack_limit.load(Ordering::SeqCst);
        Ok(batch.iter().take(limit).map(|_| self.ack()).collect())
    }

    async fn query_recently_completed(
        &self,
        query: FeedQuery,
    ) -> Result<CompletedFeed, TransportError> {
        self.feed_queries.lock().push(query);

        if let Some(scripted) = self.feeds.lock().pop_front() {
            if let Ok(feed) = &scripted {
                *self.last_feed.lock() = feed.clone();
            }
            return scripted;
        }

        if self.auto_complete.load(Ordering::SeqCst) {
            return Ok(CompletedFeed {
                done: self
                    .acked
                    .lock()
                    .iter()
                    .map(|&id| CompletionRecord::completed(id))
                    .collect(),
            });
        }
        Ok(self.last_feed.lock().clone())
    }
}

/// Notifier collecting every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices.lock().iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Counts continuation invocations
#[derive(Debug, Default)]
pub struct ContinuationCounter {
    success: AtomicUsize,
    error: AtomicUsize,
    in_progress: AtomicUsize,
    last_ids: Mutex<Vec<ActionId>>,
    last_error: Mutex<Option<String>>,
}

impl ContinuationCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Continuations wired to this counter, including `on_in_progress`
    pub fn continuations(self: &Arc<Self>) -> Continuations {
        let in_progress = Arc::clone(self);
        self.success_and_error().on_in_progress(move |ids| {
            in_progress.in_progress.fetch_add(1, Ordering::SeqCst);
            *in_progress.last_ids.lock() = ids.to_vec();
        })
    }

    /// Continuations wired to this counter, without `on_in_progress`
    pub fn success_and_error(self: &Arc<Self>) -> Continuations {
        let (success, error) = (Arc::clone(self), Arc::clone(self));
        Continuations::new()
            .on_success(move |ids| {
                success.success.fetch_add(1, Ordering::SeqCst);
                *success.last_ids.lock() = ids.to_vec();
            })
            .on_error(move |e| {
                error.error.fetch_add(1, Ordering::SeqCst);
                *error.last_error.lock() = Some(e.to_string());
            })
    }

    pub fn successes(&self) -> usize {
        self.success.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.error.load(Ordering::SeqCst)
    }

    pub fn in_progress(&self) -> usize {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Total continuations fired
    pub fn fired(&self) -> usize {
        self.successes() + self.errors() + self.in_progress()
    }

    pub fn last_ids(&self) -> Vec<ActionId> {
        self.last_ids.lock().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

/// `miner-123` on `rack-abc` with part `sp-1` on `rack-1`
pub fn sample_miner() -> Miner {
    Miner::new("miner-123", Some(RackId::new("rack-abc")))
        .with_code("M-123")
        .with_spare_parts(vec![SparePart::new("sp-1", "rack-1")])
}

/// `n` miners `m-0..m-n` with codes in the same order
pub fn miners(n: usize) -> Vec<Miner> {
    (0..n)
        .map(|i| {
            Miner::new(format!("m-{i}").as_str(), Some(RackId::new("rack-1")))
                .with_code(format!("C-{i:04}"))
        })
        .collect()
}

/// Default budget, no transport-level retries
pub fn test_config() -> RigopsConfig {
    let mut config = RigopsConfig::new();
    config.transport.max_transport_retries = 0;
    config
}
