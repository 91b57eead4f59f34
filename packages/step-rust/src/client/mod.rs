//! Remote operation clients.
//!
//! [`OperationClient`] is the seam between the poller and the remote
//! service. [`AakaasClient`] implements it against the AAKaaS OData package
//! service; tests substitute scripted implementations.

pub mod aakaas;
pub mod http;

use async_trait::async_trait;

use aakaas_core::{OperationHandle, PublishRequest, StatusReport};

use crate::error::ClientError;

pub use aakaas::{AakaasClient, Connection};

/// Submits a long-running remote operation and reports its status.
#[async_trait]
pub trait OperationClient: Send + Sync {
    /// Payload returned with a successful status.
    type Payload: Send + 'static;

    /// Triggers the remote operation.
    ///
    /// Creates at most one remote job per successful call. The remote side is
    /// not assumed to be idempotent, so callers must not retry this blindly.
    async fn submit(&self, request: &PublishRequest) -> Result<OperationHandle, ClientError>;

    /// Reads the current status of a submitted operation.
    ///
    /// Read-only and safe to repeat. A `ClientError::Transport` does not
    /// invalidate the handle.
    async fn check_status(
        &self,
        handle: &OperationHandle,
    ) -> Result<StatusReport<Self::Payload>, ClientError>;
}
