//! User-facing notices
//!
//! The orchestrator reports progress through a [`Notifier`]; presentation
//! (toasts, banners) lives behind it.

use std::fmt::{self, Display, Formatter};

/// Notice shown right after the backend accepted a submission
pub const SUBMITTED_MESSAGE: &str = "Action submitted";
/// Notice shown once completion was confirmed
pub const CONFIRMED_MESSAGE: &str = "Update will appear shortly";
/// Notice shown when confirmation ran out of attempts
pub const IN_PROGRESS_MESSAGE: &str =
    "The operation is taking longer than usual. Refresh the page to confirm.";

/// Notice class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Accepted by the backend
    Submitted,
    /// Completion observed
    Confirmed,
    /// Accepted, completion not observed within budget
    InProgress,
    /// Rejected before acceptance
    Failed,
    /// Accepted, but the completed feed could not be read
    Unconfirmed,
}

/// A notice for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Class
    pub kind: NoticeKind,
    /// Text
    pub message: String,
}

impl Notice {
    /// Submission accepted
    #[must_use]
    pub fn submitted() -> Self {
        Self::new(NoticeKind::Submitted, SUBMITTED_MESSAGE)
    }

    /// Completion confirmed
    #[must_use]
    pub fn confirmed() -> Self {
        Self::new(NoticeKind::Confirmed, CONFIRMED_MESSAGE)
    }

    /// Still in progress
    #[must_use]
    pub fn in_progress() -> Self {
        Self::new(NoticeKind::InProgress, IN_PROGRESS_MESSAGE)
    }

    /// Failure with reason
    #[must_use]
    pub fn failed(reason: impl Display) -> Self {
        Self::new(NoticeKind::Failed, format!("Failed to submit action: {reason}"))
    }

    /// Accepted, confirmation failed with reason
    #[must_use]
    pub fn unconfirmed(reason: impl Display) -> Self {
        Self::new(
            NoticeKind::Unconfirmed,
            format!("Action submitted, but its completion could not be confirmed: {reason}"),
        )
    }

    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    /// Show a notice
    fn notify(&self, notice: Notice);
}

/// Notifier writing notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Submitted | NoticeKind::Confirmed => {
                tracing::info!(kind = ?notice.kind, "{}", notice.message);
            }
            NoticeKind::InProgress | NoticeKind::Unconfirmed => {
                tracing::warn!(kind = ?notice.kind, "{}", notice.message);
            }
            NoticeKind::Failed => tracing::error!(kind = ?notice.kind, "{}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_notice_carries_reason() {
        let notice = Notice::failed("rejected: forbidden");
        assert_eq!(notice.kind, NoticeKind::Failed);
        assert_eq!(notice.to_string(), "Failed to submit action: rejected: forbidden");
    }

    #[test]
    fn unconfirmed_notice_does_not_claim_failure() {
        let notice = Notice::unconfirmed("poll attempt 1 failed");
        assert_eq!(notice.kind, NoticeKind::Unconfirmed);
        assert!(notice.message.starts_with("Action submitted"));
        assert!(!notice.message.contains("Failed to submit"));
    }

    #[test]
    fn tracing_notifier_accepts_all_kinds() {
        for notice in [
            Notice::submitted(),
            Notice::confirmed(),
            Notice::in_progress(),
            Notice::failed("x"),
            Notice::unconfirmed("y"),
        ] {
            TracingNotifier.notify(notice);
        }
    }
}
