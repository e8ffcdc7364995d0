//! Optimistic reconciler
//!
//! Removes a record from the visible list as soon as the user asks for it,
//! stashing the original in an [`OptimisticCache`]. The orchestrator's
//! outcome later decides:
//! - confirmed or still in progress: the stash is dropped (commit)
//! - failed: the record is put back at its sorted position (rollback)
//!
//! At most one removal per id may be outstanding.

use crate::cache::OptimisticCache;
use crate::error::ReconcileError;
use crate::orchestrator::{Continuations, SubmissionOutcome};
use parking_lot::RwLock;
use rigops_action::{Miner, ThingId};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

/// A row of a visible list the reconciler can manage
pub trait ListRecord: Clone + Send + Sync {
    /// Record identity
    type Id: Eq + Hash + Clone + Debug + Display + Send + Sync;
    /// Ordering of the visible list
    type SortKey: Ord;

    /// Identity of this record
    fn record_id(&self) -> Self::Id;

    /// Position of this record in the visible list
    fn sort_key(&self) -> Self::SortKey;
}

impl ListRecord for Miner {
    type Id = ThingId;
    type SortKey = (Option<String>, ThingId);

    fn record_id(&self) -> ThingId {
        self.id.clone()
    }

    fn sort_key(&self) -> Self::SortKey {
        (self.code.clone(), self.id.clone())
    }
}

/// Visible list plus the stash of records removed ahead of confirmation
pub struct OptimisticReconciler<R: ListRecord> {
    visible: RwLock<Vec<R>>,
    cache: Arc<OptimisticCache<R::Id, R>>,
}

impl<R: ListRecord> OptimisticReconciler<R> {
    /// Create reconciler over `records` with a private cache
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self::with_cache(records, Arc::new(OptimisticCache::new()))
    }

    /// Create reconciler with an injected cache
    #[must_use]
    pub fn with_cache(mut records: Vec<R>, cache: Arc<OptimisticCache<R::Id, R>>) -> Self {
        records.sort_by_cached_key(R::sort_key);
        Self {
            visible: RwLock::new(records),
            cache,
        }
    }

    /// Hide the record with `id` and stash it
    ///
    /// # Errors
    /// - [`ReconcileError::AlreadyPending`] if a removal for `id` is outstanding
    /// - [`ReconcileError::NotFound`] if `id` is not visible
    pub fn remove_optimistically(&self, id: &R::Id) -> Result<R, ReconcileError> {
        let mut visible = self.visible.write();

        if self.cache.contains(id) {
            return Err(ReconcileError::AlreadyPending(id.to_string()));
        }
        let pos = visible
            .iter()
            .position(|r| &r.record_id() == id)
            .ok_or_else(|| ReconcileError::NotFound(id.to_string()))?;

        let record = visible.remove(pos);
        if let Err(record) = self.cache.put(id.clone(), record.clone()) {
            visible.insert(pos, record);
            return Err(ReconcileError::AlreadyPending(id.to_string()));
        }

        tracing::debug!(%id, "record hidden pending confirmation");
        Ok(record)
    }

    /// Make the removal of `id` permanent; false if nothing was pending
    pub fn commit(&self, id: &R::Id) -> bool {
        let committed = self.cache.remove(id);
        if committed {
            tracing::debug!(%id, "optimistic removal committed");
        }
        committed
    }

    /// Put the stashed record for `id` back; false if nothing was pending
    pub fn rollback(&self, id: &R::Id) -> bool {
        let mut visible = self.visible.write();
        let Some(record) = self.cache.restore(id) else {
            return false;
        };

        if !visible.iter().any(|r| &r.record_id() == id) {
            let key = record.sort_key();
            let pos = visible.partition_point(|r| r.sort_key() <= key);
            visible.insert(pos, record);
        }
        tracing::info!(%id, "optimistic removal rolled back");
        true
    }

    /// Apply an orchestrator outcome to the pending removal of `id`
    ///
    /// Failures roll back; confirmed and in-progress outcomes commit.
    pub fn settle(&self, id: &R::Id, outcome: &SubmissionOutcome) -> bool {
        if outcome.is_failure() {
            self.rollback(id)
        } else {
            self.commit(id)
        }
    }

    /// Snapshot of the visible list
    #[must_use]
    pub fn visible(&self) -> Vec<R> {
        self.visible.read().clone()
    }

    /// Number of visible records
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.read().len()
    }

    /// Whether the visible list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.read().is_empty()
    }

    /// Replace the visible list after a full refresh
    ///
    /// Records with an outstanding removal stay hidden.
    pub fn replace_all(&self, mut records: Vec<R>) {
        let mut visible = self.visible.write();
        records.retain(|r| !self.cache.contains(&r.record_id()));
        records.sort_by_cached_key(R::sort_key);
        *visible = records;
    }

    /// Ids with an outstanding removal
    #[must_use]
    pub fn pending_ids(&self) -> Vec<R::Id> {
        self.cache.keys()
    }

    /// Whether a removal for `id` is outstanding
    #[inline]
    #[must_use]
    pub fn is_pending(&self, id: &R::Id) -> bool {
        self.cache.contains(id)
    }
}

impl<R> OptimisticReconciler<R>
where
    R: ListRecord + 'static,
{
    /// Continuations that settle the pending removal of `id`
    #[must_use]
    pub fn continuations(self: &Arc<Self>, id: R::Id) -> Continuations {
        let (committed, in_progress, failed) =
            (Arc::clone(self), Arc::clone(self), Arc::clone(self));
        let (success_id, progress_id) = (id.clone(), id.clone());
        Continuations::new()
            .on_success(move |_| {
                committed.commit(&success_id);
            })
            .on_in_progress(move |_| {
                in_progress.commit(&progress_id);
            })
            .on_error(move |_| {
                failed.rollback(&id);
            })
    }
}

impl<R: ListRecord> Debug for OptimisticReconciler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticReconciler")
            .field("visible", &self.len())
            .field("pending", &self.cache.len())
            .finish()
    }
}
