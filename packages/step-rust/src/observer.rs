//! Progress hooks for polling sessions.
//!
//! The poller reports every step of a session through a [`PollObserver`]
//! handed to it at construction instead of writing to process-wide logging
//! state. [`TracingObserver`] forwards to `tracing`; tests plug in recorders.

use std::time::Duration;

use tracing::{debug, info, warn};

use aakaas_core::{OperationHandle, OperationStatus};

use crate::error::ClientError;

/// Receives notifications about a polling session. All methods default to
/// no-ops.
pub trait PollObserver: Send + Sync {
    /// The remote operation was accepted.
    fn submitted(&self, _handle: &OperationHandle) {}

    /// Submitting failed; the session ends without polling.
    fn submit_failed(&self, _error: &ClientError) {}

    /// Status check number `check` (1-based) completed.
    fn status_checked(
        &self,
        _handle: &OperationHandle,
        _check: u32,
        _status: OperationStatus,
        _reason: Option<&str>,
    ) {
    }

    /// Status check number `check` failed.
    fn check_failed(&self, _handle: &OperationHandle, _check: u32, _error: &ClientError) {}

    /// The session produced its result.
    fn finished(&self, _outcome: &'static str, _checks: u32, _elapsed: Duration) {}
}

/// Observer that emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PollObserver for TracingObserver {
    fn submitted(&self, handle: &OperationHandle) {
        info!(
            target_vector = handle.id(),
            scope = handle.scope().code(),
            "Waiting for target vector publishing to finish"
        );
    }

    fn submit_failed(&self, error: &ClientError) {
        warn!(category = error.category().as_str(), error = %error, "publication could not be triggered");
    }

    fn status_checked(
        &self,
        handle: &OperationHandle,
        check: u32,
        status: OperationStatus,
        reason: Option<&str>,
    ) {
        if status.is_terminal() {
            info!(
                target_vector = handle.id(),
                check,
                status = status.as_str(),
                reason = reason.unwrap_or_default(),
                "terminal status reached"
            );
        } else {
            debug!(
                target_vector = handle.id(),
                check,
                status = status.as_str(),
                reason = reason.unwrap_or_default(),
                "status checked"
            );
        }
    }

    fn check_failed(&self, handle: &OperationHandle, check: u32, error: &ClientError) {
        if error.is_transient() {
            warn!(target_vector = handle.id(), check, error = %error, "status check failed, polling continues");
        } else {
            warn!(target_vector = handle.id(), check, error = %error, "status check rejected");
        }
    }

    fn finished(&self, outcome: &'static str, checks: u32, elapsed: Duration) {
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = elapsed.as_millis() as u64;
        info!(outcome, checks, duration_ms, "polling session complete");
    }
}
