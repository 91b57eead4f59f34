//! Bounded polling of a long-running remote operation.
//!
//! A session submits the operation exactly once, then checks its status at
//! a fixed interval until a terminal status is observed or the time budget
//! runs out:
//!
//! 1. `submit`. Any error ends the session; submission is never retried.
//! 2. `deadline = now + max_runtime`.
//! 3. Loop: stop with `TimedOut` if `now >= deadline`; otherwise check the
//!    status, return on `Succeeded`/`Failed`, and sleep
//!    `min(interval, deadline - now)`.
//!
//! Transient status-check failures keep the loop going. The deadline is the
//! only bound on the number of checks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info_span, Instrument};

use aakaas_core::{OperationStatus, PollBudget, PublishRequest};

use crate::client::OperationClient;
use crate::clock::Clock;
use crate::error::{ClientError, StepError};
use crate::observer::{PollObserver, TracingObserver};

// ---------------------------------------------------------------------------
// PollResult
// ---------------------------------------------------------------------------

/// Terminal outcome of one polling session. Exactly one is produced per
/// session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult<P> {
    /// The operation succeeded; carries the payload reported with it.
    Succeeded { payload: Option<P>, checks: u32 },
    /// The operation reached its failed state.
    Failed { reason: String, checks: u32 },
    /// No terminal status was observed within the budget.
    TimedOut { checks: u32, elapsed: Duration },
    /// Submission failed, or a status check failed non-transiently.
    TransportError(ClientError),
}

impl<P> PollResult<P> {
    /// Short label for logs and telemetry.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
            Self::TransportError(_) => "error",
        }
    }

    /// Converts the session outcome into the step's error taxonomy.
    ///
    /// # Errors
    ///
    /// Every variant except `Succeeded` maps to a `StepError`.
    pub fn into_result(self) -> Result<Option<P>, StepError> {
        match self {
            Self::Succeeded { payload, .. } => Ok(payload),
            Self::Failed { reason, .. } => Err(StepError::RemoteFailure { reason }),
            Self::TimedOut { checks, elapsed } => Err(StepError::TimedOut { elapsed, checks }),
            Self::TransportError(err) => Err(StepError::Client(err)),
        }
    }
}

// ---------------------------------------------------------------------------
// BoundedPoller
// ---------------------------------------------------------------------------

/// Drives submit -> poll -> resolve for one remote operation.
///
/// Generic over the client and the clock so tests run against scripted
/// responses in virtual time.
pub struct BoundedPoller<C, K> {
    client: C,
    clock: K,
    budget: PollBudget,
    observer: Arc<dyn PollObserver>,
}

impl<C, K> BoundedPoller<C, K>
where
    C: OperationClient,
    K: Clock,
{
    /// Creates a poller reporting through [`TracingObserver`].
    ///
    /// The budget is already validated by construction, so no network call
    /// can happen with an invalid one.
    #[must_use]
    pub fn new(client: C, clock: K, budget: PollBudget) -> Self {
        Self {
            client,
            clock,
            budget,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PollObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs one polling session for `request`.
    pub async fn run(&self, request: &PublishRequest) -> PollResult<C::Payload> {
        let span = info_span!(
            "poll_session",
            target_vector = request.target_vector_id(),
            scope = request.scope().code(),
            checks = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        async move {
            let started = self.clock.now();
            let (result, checks) = self.drive(request).await;
            let elapsed = self.clock.now().saturating_sub(started);

            let outcome = result.outcome();
            tracing::Span::current().record("checks", checks);
            tracing::Span::current().record("outcome", outcome);
            self.observer.finished(outcome, checks, elapsed);

            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, request: &PublishRequest) -> (PollResult<C::Payload>, u32) {
        let handle = match self.client.submit(request).await {
            Ok(handle) => handle,
            Err(err) => {
                self.observer.submit_failed(&err);
                return (PollResult::TransportError(err), 0);
            }
        };
        self.observer.submitted(&handle);

        let started = self.clock.now();
        // A runtime too large to represent never expires.
        let deadline = started
            .checked_add(self.budget.max_runtime())
            .unwrap_or(Duration::MAX);
        let mut checks: u32 = 0;

        loop {
            let now = self.clock.now();
            if now >= deadline {
                return (
                    PollResult::TimedOut {
                        checks,
                        elapsed: now.saturating_sub(started),
                    },
                    checks,
                );
            }

            checks = checks.saturating_add(1);
            match self.client.check_status(&handle).await {
                Ok(report) => {
                    self.observer.status_checked(
                        &handle,
                        checks,
                        report.status,
                        report.reason.as_deref(),
                    );
                    // Terminal statuses win even if the deadline passed
                    // while this check was in flight.
                    match report.status {
                        OperationStatus::Succeeded => {
                            return (
                                PollResult::Succeeded {
                                    payload: report.payload,
                                    checks,
                                },
                                checks,
                            );
                        }
                        OperationStatus::Failed => {
                            let reason = report
                                .reason
                                .unwrap_or_else(|| format!("operation {handle} failed"));
                            return (PollResult::Failed { reason, checks }, checks);
                        }
                        OperationStatus::Pending
                        | OperationStatus::Running
                        | OperationStatus::Unknown => {}
                    }
                }
                Err(err) => {
                    self.observer.check_failed(&handle, checks, &err);
                    if !err.is_transient() {
                        return (PollResult::TransportError(err), checks);
                    }
                }
            }

            let remaining = deadline.saturating_sub(self.clock.now());
            self.clock.sleep(self.budget.interval().min(remaining)).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
