//! Command-line and environment configuration of the step.
//!
//! Flag names follow the pipeline's camelCase parameter names. Every flag
//! falls back to a `PIPER_<name>` environment variable.

use std::fmt;

use clap::{Parser, ValueEnum};
use reqwest::Url;

use aakaas_core::{AddonDescriptor, Credentials, PollBudget, PublishRequest, TargetVectorScope};

use crate::client::Connection;
use crate::error::StepError;

/// Default AAKaaS endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://apps.support.sap.com";

/// Name of this step in logs and telemetry.
pub const STEP_NAME: &str = "abapAddonAssemblyKitPublishTargetVector";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Raw step parameters.
///
/// This step reads the Target Vector ID from the addon descriptor and
/// triggers the publication of the Target Vector. With scope "T" the Target
/// Vector is published to the test environment, with scope "P" to the
/// productive environment.
#[derive(Clone, Parser)]
#[command(name = "aakaas-publish-target-vector", version, about, long_about = None)]
pub struct StepArgs {
    /// Base URL to the Addon Assembly Kit as a Service (AAKaaS) system
    #[arg(
        long = "abapAddonAssemblyKitEndpoint",
        env = "PIPER_abapAddonAssemblyKitEndpoint",
        default_value = DEFAULT_ENDPOINT
    )]
    pub endpoint: String,

    /// User for the Addon Assembly Kit as a Service (AAKaaS) system
    #[arg(long = "username", env = "PIPER_username", hide_env_values = true)]
    pub username: String,

    /// Password for the Addon Assembly Kit as a Service (AAKaaS) system
    #[arg(long = "password", env = "PIPER_password", hide_env_values = true)]
    pub password: String,

    /// Determines whether the Target Vector is published to the productive ('P') or test ('T') environment
    #[arg(long = "targetVectorScope", env = "PIPER_targetVectorScope", default_value = "T")]
    pub target_vector_scope: String,

    /// Maximum runtime for status polling in minutes
    #[arg(
        long = "maxRuntimeInMinutes",
        env = "PIPER_maxRuntimeInMinutes",
        default_value_t = PollBudget::DEFAULT_MAX_RUNTIME_MINUTES,
        allow_negative_numbers = true
    )]
    pub max_runtime_in_minutes: i64,

    /// Wait time in seconds between polling calls
    #[arg(
        long = "pollingIntervalInSeconds",
        env = "PIPER_pollingIntervalInSeconds",
        default_value_t = PollBudget::DEFAULT_POLLING_INTERVAL_SECONDS,
        allow_negative_numbers = true
    )]
    pub polling_interval_in_seconds: i64,

    /// Structure containing information about the Product Version and corresponding Software Component Versions
    #[arg(long = "addonDescriptor", env = "PIPER_addonDescriptor")]
    pub addon_descriptor: String,

    /// Enable debug logging
    #[arg(short, long, env = "PIPER_verbose")]
    pub verbose: bool,

    /// Log output format
    #[arg(long = "logFormat", env = "PIPER_logFormat", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Correlation ID recorded on the step span and in telemetry (random if unset)
    #[arg(long = "correlationID", env = "PIPER_correlationID")]
    pub correlation_id: Option<String>,
}

impl fmt::Debug for StepArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepArgs")
            .field("endpoint", &self.endpoint)
            .field("username", &aakaas_core::MASK)
            .field("password", &aakaas_core::MASK)
            .field("target_vector_scope", &self.target_vector_scope)
            .field("max_runtime_in_minutes", &self.max_runtime_in_minutes)
            .field("polling_interval_in_seconds", &self.polling_interval_in_seconds)
            .field("addon_descriptor", &self.addon_descriptor)
            .field("verbose", &self.verbose)
            .field("log_format", &self.log_format)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

/// Validated configuration, ready to drive a publication.
#[derive(Debug, Clone)]
pub struct StepConfig {
    pub connection: Connection,
    pub request: PublishRequest,
    pub budget: PollBudget,
}

impl StepArgs {
    /// Secret values to mask in log output.
    #[must_use]
    pub fn secrets(&self) -> Vec<String> {
        vec![self.username.clone(), self.password.clone()]
    }

    /// Validates every parameter. Nothing here touches the network.
    ///
    /// # Errors
    ///
    /// Returns `StepError::Configuration` for an unparseable endpoint, empty
    /// credentials, a scope other than `T`/`P`, an invalid budget, or an
    /// addon descriptor without a usable target vector ID.
    pub fn into_step_config(self) -> Result<StepConfig, StepError> {
        let endpoint = Url::parse(self.endpoint.trim()).map_err(|err| {
            StepError::Configuration(format!(
                "abapAddonAssemblyKitEndpoint '{}' is not a valid URL: {err}",
                self.endpoint
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StepError::Configuration(format!(
                "abapAddonAssemblyKitEndpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(StepError::Configuration(
                "username and password must not be empty".to_string(),
            ));
        }

        let scope: TargetVectorScope = self.target_vector_scope.trim().parse()?;
        let budget = PollBudget::from_minutes_and_seconds(
            self.max_runtime_in_minutes,
            self.polling_interval_in_seconds,
        )?;
        let descriptor = AddonDescriptor::from_json(&self.addon_descriptor)?;
        let target_vector_id = descriptor.target_vector_id()?;

        Ok(StepConfig {
            connection: Connection::new(endpoint, Credentials::new(self.username, self.password)),
            request: PublishRequest::new(scope, target_vector_id),
            budget,
        })
    }
}
