//! Target vector entity of the AAKaaS OData package service.
//!
//! # Wire format
//!
//! The service returns entities wrapped in an OData v2 envelope:
//!
//! ```json
//! { "d": { "Id": "W7Q00207512600000188", "Status": "T", "PublishStatus": "S" } }
//! ```
//!
//! `Status` is the lifecycle of the vector (`G` generated, `T` published to
//! test, `P` published to production). `PublishStatus` tracks the most recent
//! publication job (`R` running, `S` success, `E` error). Both are kept as raw
//! strings so unrecognized codes survive decoding and can be reported.

use serde::{Deserialize, Serialize};

use crate::scope::TargetVectorScope;
use crate::status::{OperationStatus, StatusReport};

/// `PublishStatus` code: publication job still running.
pub const PUBLISH_STATUS_RUNNING: &str = "R";
/// `PublishStatus` code: publication job finished successfully.
pub const PUBLISH_STATUS_SUCCESS: &str = "S";
/// `PublishStatus` code: publication job failed.
pub const PUBLISH_STATUS_ERROR: &str = "E";

/// OData v2 single-entity envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ODataEnvelope<T> {
    /// The wrapped entity.
    pub d: T,
}

/// A target vector as returned by `TargetVectorSet('<id>')`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetVector {
    /// Target vector identifier.
    pub id: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_version: String,
    #[serde(default)]
    pub sps_level: String,
    #[serde(default)]
    pub patch_level: String,
    /// Lifecycle status code (`G`, `T`, `P`).
    #[serde(default)]
    pub status: String,
    /// Publication job status code (`R`, `S`, `E`).
    #[serde(default)]
    pub publish_status: String,
}

impl TargetVector {
    /// Decodes a target vector from an OData response body.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the body is not a
    /// well-formed envelope.
    pub fn from_odata_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: ODataEnvelope<Self> = serde_json::from_slice(body)?;
        Ok(envelope.d)
    }

    /// Classifies this record against the scope the publication was
    /// triggered for.
    ///
    /// A finished job only counts as success if the vector actually reached
    /// the expected lifecycle status.
    #[must_use]
    pub fn classify(self, expected: TargetVectorScope) -> StatusReport<TargetVector> {
        match self.publish_status.as_str() {
            "" => StatusReport::bare(OperationStatus::Pending),
            PUBLISH_STATUS_RUNNING => StatusReport::bare(OperationStatus::Running),
            PUBLISH_STATUS_SUCCESS if self.status == expected.code() => {
                StatusReport::succeeded(self)
            }
            PUBLISH_STATUS_SUCCESS => StatusReport::failed(format!(
                "Publishing of Targetvector {} resulted in state {} instead of expected state {}",
                self.id,
                self.status,
                expected.code()
            )),
            PUBLISH_STATUS_ERROR => StatusReport::failed(format!(
                "Publishing of Targetvector {} failed in AAKaaS",
                self.id
            )),
            other => {
                tracing::debug!(
                    target_vector = %self.id,
                    publish_status = other,
                    "unrecognized publish status"
                );
                StatusReport {
                    status: OperationStatus::Unknown,
                    reason: Some(format!("unrecognized publish status '{other}'")),
                    payload: None,
                }
            }
        }
    }
}
