//! Completion tracker
//!
//! Confirms that a set of accepted action ids reached `COMPLETED` by
//! intersecting them with the recently-completed feed. Polling is bounded:
//! `1 + max_retries` attempts with a fixed delay between them, never before
//! the first attempt or after the last.

use crate::config::TrackerConfig;
use crate::error::{TrackerError, TransportError};
use crate::transport::{FeedQuery, Transport};
use rigops_action::ActionId;
use std::collections::BTreeSet;

/// Result of one poll attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Every required id is completed
    Confirmed,
    /// Some ids are not (yet) in the feed as completed
    Pending {
        /// Ids still missing, ascending
        missing: Vec<ActionId>,
    },
    /// The feed could not be read
    Failed(TransportError),
}

/// Bounded completion poller
#[derive(Debug)]
pub struct CompletionTracker<T> {
    transport: T,
    config: TrackerConfig,
}

impl<T: Transport> CompletionTracker<T> {
    /// Create tracker
    #[inline]
    #[must_use]
    pub fn new(transport: T, config: TrackerConfig) -> Self {
        Self { transport, config }
    }

    /// Check the feed once
    ///
    /// An empty required set is confirmed without reading the feed.
    pub async fn poll_once(&self, required: &BTreeSet<ActionId>) -> PollStatus {
        if required.is_empty() {
            return PollStatus::Confirmed;
        }

        let feed = match self
            .transport
            .query_recently_completed(FeedQuery::recent(self.config.feed_limit))
            .await
        {
            Ok(feed) => feed,
            Err(e) => return PollStatus::Failed(e),
        };

        let completed: BTreeSet<ActionId> = feed
            .done
            .iter()
            .filter(|r| r.status.is_completed())
            .map(|r| r.id)
            .collect();

        let missing: Vec<ActionId> = required.difference(&completed).copied().collect();
        if missing.is_empty() {
            PollStatus::Confirmed
        } else {
            PollStatus::Pending { missing }
        }
    }

    /// Poll until every id is confirmed or the budget runs out
    ///
    /// Returns `Ok(true)` when confirmed and `Ok(false)` when the budget is
    /// exhausted; the backend may still finish later.
    ///
    /// # Errors
    /// Returns [`TrackerError::Poll`] if reading the feed fails.
    pub async fn confirm(&self, required: &[ActionId]) -> Result<bool, TrackerError> {
        let required: BTreeSet<ActionId> = required.iter().copied().collect();
        let attempts = self.config.attempts();

        for attempt in 1..=attempts {
            match self.poll_once(&required).await {
                PollStatus::Confirmed => {
                    tracing::debug!(attempt, "actions confirmed");
                    return Ok(true);
                }
                PollStatus::Pending { missing } => {
                    tracing::debug!(attempt, ?missing, "actions not completed yet");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
                PollStatus::Failed(source) => {
                    tracing::error!(attempt, error = %source, "completed feed query failed");
                    return Err(TrackerError::Poll { attempt, source });
                }
            }
        }

        tracing::warn!(attempts, ids = ?required, "confirmation budget exhausted");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{CompletedFeed, CompletionRecord, MockTransport};
    use std::time::Duration;
    use tokio::time::Instant;

    fn config() -> TrackerConfig {
        TrackerConfig {
            max_retries: 2,
            retry_delay_ms: 3_000,
            feed_limit: 100,
        }
    }

    fn feed(ids: &[u64]) -> CompletedFeed {
        CompletedFeed {
            done: ids.iter().map(|&id| CompletionRecord::completed(id)).collect(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_confirm_does_not_wait() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed()
            .withf(|q| q.limit == 100 && q.reverse)
            .times(1)
            .returning(|_| Ok(feed(&[1, 2, 3])));

        let tracker = CompletionTracker::new(mock, config());
        let start = Instant::now();
        assert!(tracker.confirm(&[ActionId(1), ActionId(2)]).await.unwrap());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_three_attempts() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed()
            .times(3)
            .returning(|_| Ok(feed(&[1])));

        let tracker = CompletionTracker::new(mock, config());
        let start = Instant::now();
        assert!(!tracker.confirm(&[ActionId(1), ActionId(2)]).await.unwrap());
        // Two delays: between attempts 1-2 and 2-3
        assert_eq!(start.elapsed(), Duration::from_millis(6_000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_completed_status_does_not_count() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed().times(3).returning(|_| {
            Ok(CompletedFeed {
                done: vec![CompletionRecord::with_status(5u64, "DENIED")],
            })
        });

        let tracker = CompletionTracker::new(mock, config());
        assert!(!tracker.confirm(&[ActionId(5)]).await.unwrap());
    }

    #[tokio::test]
    async fn empty_set_confirms_without_polling() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed().never();

        let tracker = CompletionTracker::new(mock, config());
        assert!(tracker.confirm(&[]).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn feed_failure_propagates() {
        let mut mock = MockTransport::new();
        let mut calls = 0;
        mock.expect_query_recently_completed()
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(feed(&[]))
                } else {
                    Err(TransportError::Unavailable("gateway".into()))
                }
            });

        let tracker = CompletionTracker::new(mock, config());
        let err = tracker.confirm(&[ActionId(1)]).await.unwrap_err();
        assert_eq!(
            err,
            TrackerError::Poll {
                attempt: 2,
                source: TransportError::Unavailable("gateway".into()),
            }
        );
    }

    #[tokio::test]
    async fn poll_once_reports_missing() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed()
            .returning(|_| Ok(feed(&[2])));

        let tracker = CompletionTracker::new(mock, config());
        let required: BTreeSet<_> = [ActionId(3), ActionId(1), ActionId(2)].into_iter().collect();
        assert_eq!(
            tracker.poll_once(&required).await,
            PollStatus::Pending {
                missing: vec![ActionId(1), ActionId(3)]
            }
        );
    }
}
