//! Per-invocation telemetry record.

use std::time::Duration;

use serde::Serialize;

use crate::error::StepError;

/// Error category reported when the step succeeded.
pub const CATEGORY_UNDEFINED: &str = "undefined";

/// Summary of one step invocation, emitted once at exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step_name: String,
    pub correlation_id: String,
    pub duration_ms: u64,
    /// `"0"` on success, `"1"` otherwise.
    pub error_code: &'static str,
    pub error_category: &'static str,
}

impl StepReport {
    #[must_use]
    pub fn new(
        step_name: &str,
        correlation_id: &str,
        duration: Duration,
        outcome: Result<(), &StepError>,
    ) -> Self {
        let (error_code, error_category) = match outcome {
            Ok(()) => ("0", CATEGORY_UNDEFINED),
            Err(err) => ("1", err.category().as_str()),
        };
        Self {
            step_name: step_name.to_string(),
            correlation_id: correlation_id.to_string(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            error_code,
            error_category,
        }
    }

    /// Emits the report as a structured log event.
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => tracing::info!(
                step = %self.step_name,
                correlation_id = %self.correlation_id,
                duration_ms = self.duration_ms,
                error_code = self.error_code,
                error_category = self.error_category,
                telemetry = %json,
                "step telemetry"
            ),
            Err(err) => tracing::warn!(error = %err, "failed to serialize step telemetry"),
        }
    }
}
