//! Error taxonomy of the publish step.
//!
//! `ClientError` classifies failures of individual remote calls. `StepError`
//! is the single classified outcome surfaced to the caller of the step; its
//! [`ErrorCategory`] is the externally visible signal that tells a
//! configuration mistake from a remote failure from a timeout.

use std::fmt;
use std::time::Duration;

use aakaas_core::{BudgetError, DescriptorError, ScopeError};

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Coarse classification reported in telemetry and in the final log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Validation,
    Transport,
    Remote,
    Timeout,
}

impl ErrorCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::Remote => "remote",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

/// Failure of a single submit or status-check call.
///
/// Messages never contain credentials: requests carry them only in the
/// `Authorization` header, which is not part of any formatted error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Network failure, server error, or throttling. Safe to retry for
    /// read-only calls.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Credentials were rejected (HTTP 401/403).
    #[error("authentication rejected by AAKaaS (HTTP {status})")]
    Auth { status: u16 },
    /// The service rejected the request itself (any other HTTP 4xx).
    #[error("request rejected by AAKaaS (HTTP {status}): {message}")]
    Validation { status: u16, message: String },
}

impl ClientError {
    /// Creates a transport error from any displayable cause.
    #[must_use]
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport {
            message: cause.to_string(),
        }
    }

    /// Returns `true` if repeating a read-only call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Auth { .. } => ErrorCategory::Authentication,
            Self::Validation { .. } => ErrorCategory::Validation,
        }
    }
}

// ---------------------------------------------------------------------------
// StepError
// ---------------------------------------------------------------------------

/// Terminal, classified failure of one step invocation.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// Rejected before any network call.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A remote call failed in a way polling cannot recover from.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The remote operation reached its failed terminal state.
    #[error("{reason}")]
    RemoteFailure { reason: String },
    /// The budget ran out before a terminal status was observed.
    #[error("Timed out: no terminal status after {}s and {checks} status checks", .elapsed.as_secs())]
    TimedOut { elapsed: Duration, checks: u32 },
}

impl StepError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Client(err) => err.category(),
            Self::RemoteFailure { .. } => ErrorCategory::Remote,
            Self::TimedOut { .. } => ErrorCategory::Timeout,
        }
    }
}

impl From<BudgetError> for StepError {
    fn from(err: BudgetError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<ScopeError> for StepError {
    fn from(err: ScopeError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<DescriptorError> for StepError {
    fn from(err: DescriptorError) -> Self {
        Self::Configuration(err.to_string())
    }
}
