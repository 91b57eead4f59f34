//! Time budget of a polling session.

use std::time::Duration;

/// Maximum runtime and polling cadence of one polling session.
///
/// The only way to obtain a `PollBudget` is through a validating
/// constructor, so every instance satisfies `0 < interval <= max_runtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    max_runtime: Duration,
    interval: Duration,
}

/// Rejected budget configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    #[error("polling interval must be greater than zero")]
    ZeroInterval,
    #[error("maximum runtime must be greater than zero")]
    ZeroRuntime,
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
    #[error("polling interval {interval:?} exceeds maximum runtime {max_runtime:?}")]
    IntervalExceedsRuntime {
        interval: Duration,
        max_runtime: Duration,
    },
}

impl PollBudget {
    /// Default maximum runtime in minutes.
    pub const DEFAULT_MAX_RUNTIME_MINUTES: i64 = 5;
    /// Default polling interval in seconds.
    pub const DEFAULT_POLLING_INTERVAL_SECONDS: i64 = 30;

    /// Creates a budget after checking `0 < interval <= max_runtime`.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError` when either duration is zero or the interval is
    /// longer than the maximum runtime.
    pub fn new(max_runtime: Duration, interval: Duration) -> Result<Self, BudgetError> {
        if interval.is_zero() {
            return Err(BudgetError::ZeroInterval);
        }
        if max_runtime.is_zero() {
            return Err(BudgetError::ZeroRuntime);
        }
        if interval > max_runtime {
            return Err(BudgetError::IntervalExceedsRuntime {
                interval,
                max_runtime,
            });
        }
        Ok(Self {
            max_runtime,
            interval,
        })
    }

    /// Creates a budget from the step's integer configuration values.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Negative` for negative inputs, otherwise the
    /// same errors as [`PollBudget::new`].
    pub fn from_minutes_and_seconds(
        max_runtime_minutes: i64,
        polling_interval_seconds: i64,
    ) -> Result<Self, BudgetError> {
        let minutes = u64::try_from(max_runtime_minutes).map_err(|_| BudgetError::Negative {
            field: "maxRuntimeInMinutes",
            value: max_runtime_minutes,
        })?;
        let seconds =
            u64::try_from(polling_interval_seconds).map_err(|_| BudgetError::Negative {
                field: "pollingIntervalInSeconds",
                value: polling_interval_seconds,
            })?;
        Self::new(
            Duration::from_secs(minutes.saturating_mul(60)),
            Duration::from_secs(seconds),
        )
    }

    /// Total wall-clock time the session may spend polling.
    #[must_use]
    pub fn max_runtime(&self) -> Duration {
        self.max_runtime
    }

    /// Wait between two status checks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_runtime: Duration::from_secs(5 * 60),
            interval: Duration::from_secs(30),
        }
    }
}
