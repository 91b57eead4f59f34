mod common;

use std::time::Duration;

use aakaas_step::{execute, run_step, Clock, ErrorCategory, ManualClock, StepError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    args_for, hits, mount_submit, publish_path, status_path, tv_response, LogCapture, PASSWORD,
    USERNAME,
};

#[tokio::test]
async fn publishes_to_test_after_running_checks() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("G", "R"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("T", "S"))
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let config = args_for(&server, &[]).into_step_config().unwrap();
    let vector = run_step(config, clock.clone()).await.unwrap().unwrap();

    assert_eq!(vector.status, "T");
    assert_eq!(vector.product_name, "/DRNMSPC/PRD01");
    assert_eq!(hits(&server, &status_path()).await, 3);
    assert_eq!(hits(&server, &publish_path()).await, 1);
    assert_eq!(clock.now(), Duration::from_secs(60));
}

#[tokio::test]
async fn publish_error_status_is_remote_failure() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("G", "E"))
        .mount(&server)
        .await;

    let config = args_for(&server, &["--targetVectorScope", "P"])
        .into_step_config()
        .unwrap();
    let err = run_step(config, ManualClock::new()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Remote);
    assert!(err.to_string().contains("failed in AAKaaS"));
    assert_eq!(hits(&server, &status_path()).await, 1);
}

#[tokio::test]
async fn published_to_unexpected_scope_is_remote_failure() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("T", "S"))
        .mount(&server)
        .await;

    let config = args_for(&server, &["--targetVectorScope", "P"])
        .into_step_config()
        .unwrap();
    let err = run_step(config, ManualClock::new()).await.unwrap_err();

    assert!(matches!(
        err,
        StepError::RemoteFailure { ref reason } if reason.contains("instead of expected state P")
    ));
}

#[tokio::test]
async fn always_running_times_out_after_two_checks() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("G", "R"))
        .mount(&server)
        .await;

    let config = args_for(
        &server,
        &["--maxRuntimeInMinutes", "1", "--pollingIntervalInSeconds", "30"],
    )
    .into_step_config()
    .unwrap();
    let err = run_step(config, ManualClock::new()).await.unwrap_err();

    assert!(matches!(err, StepError::TimedOut { checks: 2, .. }));
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert_eq!(hits(&server, &status_path()).await, 2);
}

#[tokio::test]
async fn server_errors_during_polling_are_retried() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("T", "S"))
        .mount(&server)
        .await;

    let config = args_for(&server, &[]).into_step_config().unwrap();
    let result = run_step(config, ManualClock::new()).await;

    assert!(result.is_ok());
    assert_eq!(hits(&server, &status_path()).await, 3);
}

#[tokio::test]
async fn rejected_credentials_stop_before_publishing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = args_for(&server, &[]).into_step_config().unwrap();
    let err = run_step(config, ManualClock::new()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Authentication);
    let message = err.to_string();
    assert!(!message.contains(USERNAME));
    assert!(!message.contains(PASSWORD));
}

#[tokio::test]
async fn invalid_scope_makes_no_network_calls() {
    let server = MockServer::start().await;

    let (result, report) =
        execute(args_for(&server, &["--targetVectorScope", "X"]), "corr-1").await;

    assert_eq!(result.unwrap_err().category(), ErrorCategory::Configuration);
    assert_eq!(report.error_code, "1");
    assert_eq!(report.error_category, "configuration");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn interval_longer_than_runtime_makes_no_network_calls() {
    let server = MockServer::start().await;

    let (result, report) = execute(
        args_for(
            &server,
            &["--maxRuntimeInMinutes", "1", "--pollingIntervalInSeconds", "61"],
        ),
        "corr-2",
    )
    .await;

    assert_eq!(result.unwrap_err().category(), ErrorCategory::Configuration);
    assert_eq!(report.correlation_id, "corr-2");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn huge_runtime_still_publishes() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("T", "S"))
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    clock.advance(Duration::from_secs(1));
    let config = args_for(&server, &["--maxRuntimeInMinutes", "9223372036854775807"])
        .into_step_config()
        .unwrap();
    let result = run_step(config, clock).await;

    assert!(result.is_ok());
    assert_eq!(hits(&server, &status_path()).await, 1);
}

#[tokio::test]
async fn step_logs_carry_correlation_id() {
    let server = MockServer::start().await;
    mount_submit(&server).await;
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(tv_response("T", "S"))
        .mount(&server)
        .await;

    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let capture = capture.clone();
            move || capture.clone()
        })
        .with_ansi(false)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let (result, _report) = execute(args_for(&server, &[]), "corr-4711").await;

    assert!(result.is_ok());
    let output = capture.contents();
    let publish_line = output
        .lines()
        .find(|line| line.contains("Publish target vector"))
        .unwrap();
    assert!(publish_line.contains("corr-4711"));
    let success_line = output
        .lines()
        .find(|line| line.contains("Success: Publishing finished"))
        .unwrap();
    assert!(success_line.contains("corr-4711"));
}
