//! Request queue for backend calls
//!
//! Bounds concurrent requests per route with one semaphore each. The queue
//! is constructed explicitly and injected into [`QueuedTransport`]; there is
//! no process-wide instance.

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::transport::{CompletedFeed, FeedQuery, SubmitAck, Transport};
use dashmap::DashMap;
use rigops_action::{Action, BatchDescriptor};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Backend entry point a request is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Single-action submission
    SubmitSingle,
    /// Batch submission
    SubmitBatch,
    /// Recently-completed feed
    RecentlyCompleted,
}

/// Per-route concurrency limiter
#[derive(Debug)]
pub struct RequestQueue {
    limit: usize,
    routes: DashMap<Route, Arc<Semaphore>>,
}

impl RequestQueue {
    /// Create queue allowing `limit` in-flight requests per route
    ///
    /// A limit of 0 is raised to 1 so every route can make progress.
    #[inline]
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            routes: DashMap::new(),
        }
    }

    /// Create queue from transport settings
    #[inline]
    #[must_use]
    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.max_in_flight_per_route)
    }

    /// Wait for a slot on `route`
    ///
    /// # Errors
    /// Returns [`TransportError::QueueClosed`] after [`RequestQueue::close`].
    pub async fn acquire(&self, route: Route) -> Result<OwnedSemaphorePermit, TransportError> {
        self.semaphore(route)
            .acquire_owned()
            .await
            .map_err(|_| TransportError::QueueClosed)
    }

    /// Requests currently holding a slot on `route`
    #[must_use]
    pub fn in_flight(&self, route: Route) -> usize {
        self.routes
            .get(&route)
            .map_or(0, |s| self.limit.saturating_sub(s.available_permits()))
    }

    /// Refuse further requests on every route
    pub fn close(&self) {
        for route in [Route::SubmitSingle, Route::SubmitBatch, Route::RecentlyCompleted] {
            self.semaphore(route).close();
        }
    }

    fn semaphore(&self, route: Route) -> Arc<Semaphore> {
        self.routes
            .entry(route)
            .or_insert_with(|| Arc::new(Semaphore::new(self.limit)))
            .clone()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

/// Transport wrapper applying the request queue and transport-level retry
///
/// Retries only [`TransportError::is_retryable`] failures, with a fixed
/// delay. The slot is released while waiting to retry.
#[derive(Debug)]
pub struct QueuedTransport<T> {
    inner: T,
    queue: Arc<RequestQueue>,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: Transport> QueuedTransport<T> {
    /// Wrap `inner` with a shared queue
    #[must_use]
    pub fn new(inner: T, queue: Arc<RequestQueue>, config: &TransportConfig) -> Self {
        Self {
            inner,
            queue,
            max_retries: config.max_transport_retries,
            retry_delay: config.retry_delay(),
        }
    }

    async fn call<R, F, Fut>(&self, route: Route, mut f: F) -> Result<R, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, TransportError>>,
    {
        let mut attempt = 0u32;
        loop {
            let permit = self.queue.acquire(route).await?;
            let result = f().await;
            drop(permit);

            match result {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(?route, attempt, error = %e, "retrying transport call");
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for QueuedTransport<T> {
    async fn submit_single_action(&self, action: &Action) -> Result<SubmitAck, TransportError> {
        self.call(Route::SubmitSingle, || self.inner.submit_single_action(action))
            .await
    }

    async fn submit_batch_action(
        &self,
        batch: &BatchDescriptor,
    ) -> Result<Vec<SubmitAck>, TransportError> {
        self.call(Route::SubmitBatch, || self.inner.submit_batch_action(batch))
            .await
    }

    async fn query_recently_completed(
        &self,
        query: FeedQuery,
    ) -> Result<CompletedFeed, TransportError> {
        self.call(Route::RecentlyCompleted, || {
            self.inner.query_recently_completed(query)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use rigops_action::{ActionId, ThingId};

    fn config(retries: u32) -> TransportConfig {
        TransportConfig {
            max_in_flight_per_route: 2,
            max_transport_retries: retries,
            transport_retry_delay_ms: 100,
        }
    }

    #[tokio::test]
    async fn slots_are_per_route() {
        let queue = RequestQueue::new(1);
        let single = queue.acquire(Route::SubmitSingle).await.unwrap();
        assert_eq!(queue.in_flight(Route::SubmitSingle), 1);

        // Another route is unaffected
        let feed = queue.acquire(Route::RecentlyCompleted).await.unwrap();
        assert_eq!(queue.in_flight(Route::RecentlyCompleted), 1);

        drop(single);
        drop(feed);
        assert_eq!(queue.in_flight(Route::SubmitSingle), 0);
    }

    #[tokio::test]
    async fn zero_limit_still_admits_one() {
        let queue = RequestQueue::new(0);
        let _slot = queue.acquire(Route::SubmitSingle).await.unwrap();
        assert_eq!(queue.in_flight(Route::SubmitSingle), 1);
    }

    #[tokio::test]
    async fn closed_queue_refuses() {
        let queue = RequestQueue::new(1);
        queue.close();
        assert_eq!(
            queue.acquire(Route::SubmitBatch).await.unwrap_err(),
            TransportError::QueueClosed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retries_retryable_errors() {
        let mut mock = MockTransport::new();
        let mut calls = 0;
        mock.expect_submit_single_action().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(TransportError::Unavailable("reset".into()))
            } else {
                Ok(SubmitAck { id: ActionId(9) })
            }
        });

        let transport = QueuedTransport::new(mock, Arc::new(RequestQueue::new(2)), &config(2));
        let ack = transport
            .submit_single_action(&Action::forget(None, ThingId::new("a")))
            .await
            .unwrap();
        assert_eq!(ack.id, ActionId(9));
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_is_not_retried() {
        let mut mock = MockTransport::new();
        mock.expect_query_recently_completed()
            .times(1)
            .returning(|_| {
                Err(TransportError::Rejected {
                    status: 400,
                    message: "bad".into(),
                })
            });

        let transport = QueuedTransport::new(mock, Arc::new(RequestQueue::new(2)), &config(5));
        let err = transport
            .query_recently_completed(FeedQuery::recent(10))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected { status: 400, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_bounded() {
        let mut mock = MockTransport::new();
        mock.expect_submit_batch_action()
            .times(3)
            .returning(|_| Err(TransportError::Timeout { after_ms: 1000 }));

        let transport = QueuedTransport::new(mock, Arc::new(RequestQueue::new(2)), &config(2));
        let batch = BatchDescriptor::new(vec![], rigops_action::BatchClass::Move);
        let err = transport.submit_batch_action(&batch).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
