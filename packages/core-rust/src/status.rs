//! Status of a long-running remote operation as observed by a single check.

use std::fmt;

/// Observed state of a remote operation.
///
/// `Succeeded` and `Failed` are terminal. `Unknown` covers responses that
/// could not be interpreted and is treated like the non-terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    /// Accepted but not yet picked up by the remote worker.
    Pending,
    /// Being processed remotely.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished unsuccessfully.
    Failed,
    /// Response was malformed or carried an unrecognized status.
    Unknown,
}

impl OperationStatus {
    /// Returns `true` for states from which no further transition is expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Succeeded | Self::Failed => true,
            Self::Pending | Self::Running | Self::Unknown => false,
        }
    }

    /// Lowercase label used in structured log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one status check: the classified status plus whatever the
/// remote side reported alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport<P> {
    /// Classified status.
    pub status: OperationStatus,
    /// Remote-supplied explanation, set for `Failed` and sometimes `Unknown`.
    pub reason: Option<String>,
    /// Decoded response body, if it could be decoded.
    pub payload: Option<P>,
}

impl<P> StatusReport<P> {
    /// A report carrying only a status.
    #[must_use]
    pub fn bare(status: OperationStatus) -> Self {
        Self {
            status,
            reason: None,
            payload: None,
        }
    }

    /// A `Succeeded` report with its payload.
    #[must_use]
    pub fn succeeded(payload: P) -> Self {
        Self {
            status: OperationStatus::Succeeded,
            reason: None,
            payload: Some(payload),
        }
    }

    /// A `Failed` report with the remote reason.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            reason: Some(reason.into()),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(OperationStatus::Succeeded.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::Running.is_terminal());
        assert!(!OperationStatus::Unknown.is_terminal());
    }

    #[test]
    fn report_constructors() {
        let ok: StatusReport<u32> = StatusReport::succeeded(7);
        assert_eq!(ok.status, OperationStatus::Succeeded);
        assert_eq!(ok.payload, Some(7));

        let failed: StatusReport<u32> = StatusReport::failed("boom");
        assert_eq!(failed.status, OperationStatus::Failed);
        assert_eq!(failed.reason.as_deref(), Some("boom"));
        assert!(failed.payload.is_none());

        let running: StatusReport<u32> = StatusReport::bare(OperationStatus::Running);
        assert!(running.reason.is_none());
    }
}
