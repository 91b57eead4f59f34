//! Publication scope of a Target Vector.
//!
//! # Wire format
//!
//! Scopes travel as single-letter codes: `"T"` for the test environment and
//! `"P"` for the productive environment. The same codes appear in the
//! `Status` field of a target vector once publication has completed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment a Target Vector is published to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetVectorScope {
    /// Test environment (`"T"`).
    #[default]
    #[serde(rename = "T")]
    Test,
    /// Productive environment (`"P"`).
    #[serde(rename = "P")]
    Productive,
}

impl TargetVectorScope {
    /// Returns the single-letter wire code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Test => "T",
            Self::Productive => "P",
        }
    }

    /// Human-readable name of the SPS stack the scope publishes to.
    #[must_use]
    pub fn stack_name(self) -> &'static str {
        match self {
            Self::Test => "test SPS stack",
            Self::Productive => "production SPS stack",
        }
    }
}

impl fmt::Display for TargetVectorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a scope code is neither `T` nor `P`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid target vector scope '{value}', possible values are T, P")]
pub struct ScopeError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for TargetVectorScope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T" => Ok(Self::Test),
            "P" => Ok(Self::Productive),
            other => Err(ScopeError {
                value: other.to_string(),
            }),
        }
    }
}
