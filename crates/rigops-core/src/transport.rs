//! Backend transport contract
//!
//! The core only needs three endpoints: submit one action, submit one
//! batch, and read the recently-completed feed. The wire format belongs to
//! the implementor.

use crate::error::TransportError;
use chrono::{DateTime, Utc};
use rigops_action::{Action, ActionId, BatchDescriptor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acknowledgement of an accepted action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Backend-assigned action id
    pub id: ActionId,
}

impl From<u64> for SubmitAck {
    fn from(id: u64) -> Self {
        Self { id: ActionId(id) }
    }
}

/// Terminal status reported by the completed feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionStatus {
    /// Action executed
    Completed,
    /// Any other terminal state (denied, failed, ...)
    Other(String),
}

impl CompletionStatus {
    /// Whether this status counts toward confirmation
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<String> for CompletionStatus {
    fn from(value: String) -> Self {
        if value == "COMPLETED" {
            Self::Completed
        } else {
            Self::Other(value)
        }
    }
}

impl From<CompletionStatus> for String {
    fn from(value: CompletionStatus) -> Self {
        match value {
            CompletionStatus::Completed => "COMPLETED".to_string(),
            CompletionStatus::Other(s) => s,
        }
    }
}

/// One entry of the completed feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Action id
    pub id: ActionId,
    /// Terminal status
    pub status: CompletionStatus,
    /// When the backend finished the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
    /// Completed record without a timestamp
    #[must_use]
    pub fn completed(id: impl Into<ActionId>) -> Self {
        Self {
            id: id.into(),
            status: CompletionStatus::Completed,
            finished_at: None,
        }
    }

    /// Record with an arbitrary status
    #[must_use]
    pub fn with_status(id: impl Into<ActionId>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: CompletionStatus::from(status.into()),
            finished_at: None,
        }
    }
}

/// Recently-completed feed page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletedFeed {
    /// Most recent first when requested with `reverse`
    pub done: Vec<CompletionRecord>,
}

/// Query for the completed feed
///
/// A bounded recent-history window, not an id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Window size
    pub limit: usize,
    /// Newest first
    pub reverse: bool,
}

impl FeedQuery {
    /// Newest `limit` entries
    #[inline]
    #[must_use]
    pub fn recent(limit: usize) -> Self {
        Self {
            limit,
            reverse: true,
        }
    }
}

/// Backend endpoints consumed by the core
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Submit one action; returns its backend id
    async fn submit_single_action(&self, action: &Action) -> Result<SubmitAck, TransportError>;

    /// Submit an ordered batch; returns one ack per member, same order
    async fn submit_batch_action(
        &self,
        batch: &BatchDescriptor,
    ) -> Result<Vec<SubmitAck>, TransportError>;

    /// Read the recently-completed feed
    async fn query_recently_completed(
        &self,
        query: FeedQuery,
    ) -> Result<CompletedFeed, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit_single_action(&self, action: &Action) -> Result<SubmitAck, TransportError> {
        (**self).submit_single_action(action).await
    }

    async fn submit_batch_action(
        &self,
        batch: &BatchDescriptor,
    ) -> Result<Vec<SubmitAck>, TransportError> {
        (**self).submit_batch_action(batch).await
    }

    async fn query_recently_completed(
        &self,
        query: FeedQuery,
    ) -> Result<CompletedFeed, TransportError> {
        (**self).query_recently_completed(query).await
    }
}
