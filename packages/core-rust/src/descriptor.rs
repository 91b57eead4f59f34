//! Addon descriptor handed over by earlier pipeline steps.
//!
//! Only the fields this step reads are modelled; unknown fields are ignored
//! so descriptors written by newer steps still parse.

use serde::{Deserialize, Serialize};

/// Software component version entry of an addon descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonRepository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sp_level: String,
    #[serde(default)]
    pub patch_level: String,
}

/// Product version and component versions an addon is assembled from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonDescriptor {
    #[serde(default)]
    pub addon_product: String,
    #[serde(default)]
    pub addon_version: String,
    /// Identifier of the target vector created for this addon version.
    #[serde(default, rename = "targetVectorID")]
    pub target_vector_id: String,
    #[serde(default)]
    pub repositories: Vec<AddonRepository>,
}

/// Errors raised while reading an addon descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("addon descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parameter missing. Please provide the target vector id")]
    MissingTargetVectorId,
    #[error("target vector id '{0}' must consist of ASCII letters and digits only")]
    InvalidTargetVectorId(String),
}

impl AddonDescriptor {
    /// Parses a descriptor from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError::Json` for malformed input.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the target vector ID, checking it can be used as an OData key.
    ///
    /// # Errors
    ///
    /// Returns `MissingTargetVectorId` when the ID is empty and
    /// `InvalidTargetVectorId` when it contains anything but ASCII
    /// alphanumerics.
    pub fn target_vector_id(&self) -> Result<&str, DescriptorError> {
        let id = self.target_vector_id.trim();
        if id.is_empty() {
            return Err(DescriptorError::MissingTargetVectorId);
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DescriptorError::InvalidTargetVectorId(id.to_string()));
        }
        Ok(id)
    }
}
