//! Error types for rigops Core
//!
//! Provides error handling for:
//! - Transport failures (rejections, unavailability, timeouts)
//! - Submission failures (rejections, unknown actions)
//! - Confirmation polling failures
//! - Optimistic cache misuse
//! - Configuration loading

use std::path::PathBuf;

/// Main rigops error type
#[derive(Debug, thiserror::Error)]
pub enum RigopsError {
    /// Submission was rejected or could not be normalized
    #[error("submission failed: {0}")]
    Submit(#[from] SubmitError),

    /// Confirmation polling failed
    #[error("confirmation failed: {0}")]
    Tracker(#[from] TrackerError),

    /// Optimistic cache misuse
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}

impl RigopsError {
    /// Whether the backend refused the submission outright
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Submit(e) if e.is_rejection())
    }

    /// Whether the same operation may be submitted again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submit(SubmitError::Transport(e)) => e.is_retryable(),
            Self::Tracker(TrackerError::Poll { source, .. }) => source.is_retryable(),
            _ => false,
        }
    }
}

/// Errors reported by a [`crate::Transport`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Backend refused the request (validation, permission, shape)
    #[error("rejected ({status}): {message}")]
    Rejected {
        /// Backend status code
        status: u16,
        /// Backend message
        message: String,
    },

    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Request did not finish in time
    #[error("request timed out after {after_ms}ms")]
    Timeout {
        /// Elapsed time
        after_ms: u64,
    },

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// Request queue was shut down
    #[error("request queue closed")]
    QueueClosed,
}

impl TransportError {
    /// Whether a transport-level retry may help
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

/// Submission failures, captured into [`crate::SubmissionResult`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Backend rejected the submission
    #[error("rejected: {message}")]
    Rejected {
        /// Backend status code, when the transport reported one
        status: Option<u16>,
        /// Backend message
        message: String,
    },

    /// Normalization produced no create directive
    #[error("unknown action: {found}")]
    UnknownAction {
        /// What the normalizer produced instead
        found: String,
    },

    /// Transport failed before the backend could answer
    #[error("transport error: {0}")]
    Transport(TransportError),
}

impl SubmitError {
    /// Whether this is a rejection (backend or client-side)
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::UnknownAction { .. })
    }
}

impl From<TransportError> for SubmitError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Rejected { status, message } => Self::Rejected {
                status: Some(status),
                message,
            },
            other => Self::Transport(other),
        }
    }
}

/// Completion tracker failures
///
/// Not-yet-completed is not an error; see [`crate::CompletionTracker::confirm`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Fetching the completed feed failed
    #[error("poll attempt {attempt} failed: {source}")]
    Poll {
        /// 1-based attempt number
        attempt: u32,
        /// Underlying failure
        #[source]
        source: TransportError,
    },
}

/// Optimistic reconciler errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// A speculative removal for this id is already outstanding
    #[error("removal already pending for {0}")]
    AlreadyPending(String),

    /// Record is not in the visible list
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config document could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values are out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_rejection_becomes_submit_rejection() {
        let err = SubmitError::from(TransportError::Rejected {
            status: 403,
            message: "forbidden".into(),
        });
        assert!(err.is_rejection());
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn unavailable_stays_transport_error() {
        let err = SubmitError::from(TransportError::Unavailable("down".into()));
        assert!(!err.is_rejection());
        assert!(RigopsError::from(err).is_retryable());
    }

    #[test]
    fn rejection_is_not_retryable() {
        let err = RigopsError::from(SubmitError::UnknownAction {
            found: "vote".into(),
        });
        assert!(err.is_rejection());
        assert!(!err.is_retryable());
    }

    #[test]
    fn poll_error_display() {
        let err = TrackerError::Poll {
            attempt: 2,
            source: TransportError::Timeout { after_ms: 500 },
        };
        assert_eq!(
            err.to_string(),
            "poll attempt 2 failed: request timed out after 500ms"
        );
    }
}
