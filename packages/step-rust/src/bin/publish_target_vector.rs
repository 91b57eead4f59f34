//! `aakaas-publish-target-vector`: pipeline step binary.
//!
//! Exits with status 0 when the target vector was published, 1 otherwise.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use aakaas_step::logging::{init_logging, SecretMask};
use aakaas_step::{execute, StepArgs};

fn main() -> anyhow::Result<ExitCode> {
    let args = StepArgs::parse();

    init_logging(
        args.log_format,
        args.verbose,
        SecretMask::new(args.secrets()),
    )?;

    let correlation_id = args
        .correlation_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (result, report) = runtime.block_on(execute(args, &correlation_id));
    report.emit();

    match result {
        Ok(()) => {
            info!(correlation_id = %correlation_id, "SUCCESS");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(
                correlation_id = %correlation_id,
                category = err.category().as_str(),
                "step execution failed: {err}"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
