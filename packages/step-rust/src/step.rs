//! The publish-target-vector step: validate, submit, poll, report.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, Instrument};

use aakaas_core::{PollBudget, PublishRequest, TargetVector};

use crate::client::{AakaasClient, OperationClient};
use crate::clock::{Clock, TokioClock};
use crate::config::{StepArgs, StepConfig, STEP_NAME};
use crate::error::StepError;
use crate::observer::{PollObserver, TracingObserver};
use crate::poller::BoundedPoller;
use crate::telemetry::StepReport;

/// Publishes `request` through `client` and waits for the result.
///
/// # Errors
///
/// Returns the classified `StepError` for every non-success outcome.
pub async fn publish_target_vector<C, K>(
    client: C,
    clock: K,
    observer: Arc<dyn PollObserver>,
    request: &PublishRequest,
    budget: PollBudget,
) -> Result<Option<C::Payload>, StepError>
where
    C: OperationClient,
    K: Clock,
{
    info!(
        "Publish target vector {} to {}",
        request.target_vector_id(),
        request.scope().stack_name()
    );

    let poller = BoundedPoller::new(client, clock, budget).with_observer(observer);
    let payload = poller.run(request).await.into_result()?;

    info!("Success: Publishing finished");
    Ok(payload)
}

/// Runs the step against AAKaaS with a validated configuration.
///
/// # Errors
///
/// Returns `StepError` if the HTTP client cannot be built or publication
/// does not succeed.
pub async fn run_step<K: Clock>(
    config: StepConfig,
    clock: K,
) -> Result<Option<TargetVector>, StepError> {
    let client = AakaasClient::new(config.connection)?;
    publish_target_vector(
        client,
        clock,
        Arc::new(TracingObserver),
        &config.request,
        config.budget,
    )
    .await
}

/// Validates `args`, runs the step on the real clock, and produces the
/// telemetry report for the invocation.
///
/// Everything logged while the step runs belongs to a `step` span carrying
/// `correlation_id`.
pub async fn execute(args: StepArgs, correlation_id: &str) -> (Result<(), StepError>, StepReport) {
    let started = Instant::now();
    let span = info_span!("step", step = STEP_NAME, correlation_id);

    let result = async {
        let config = args.into_step_config()?;
        run_step(config, TokioClock::new()).await.map(|_| ())
    }
    .instrument(span)
    .await;

    let report = StepReport::new(
        STEP_NAME,
        correlation_id,
        started.elapsed(),
        result.as_ref().map(|_| ()),
    );
    (result, report)
}
