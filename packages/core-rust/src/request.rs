//! Publish request and the handle it yields once submitted.

use std::fmt;

use crate::scope::TargetVectorScope;

/// Request to publish one target vector to one scope.
///
/// Immutable once built; a request is submitted exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    scope: TargetVectorScope,
    target_vector_id: String,
}

impl PublishRequest {
    #[must_use]
    pub fn new(scope: TargetVectorScope, target_vector_id: impl Into<String>) -> Self {
        Self {
            scope,
            target_vector_id: target_vector_id.into(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> TargetVectorScope {
        self.scope
    }

    #[must_use]
    pub fn target_vector_id(&self) -> &str {
        &self.target_vector_id
    }
}

/// Identifies a submitted publication for subsequent status checks.
///
/// Carries the scope the publication was triggered for so that a status
/// check can tell a matching lifecycle status from a stale one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationHandle {
    id: String,
    scope: TargetVectorScope,
}

impl OperationHandle {
    #[must_use]
    pub fn new(id: impl Into<String>, scope: TargetVectorScope) -> Self {
        Self {
            id: id.into(),
            scope,
        }
    }

    /// Remote identifier of the operation.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Scope the operation was submitted for.
    #[must_use]
    pub fn scope(&self) -> TargetVectorScope {
        self.scope
    }
}

impl From<&PublishRequest> for OperationHandle {
    fn from(request: &PublishRequest) -> Self {
        Self::new(request.target_vector_id(), request.scope())
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.scope)
    }
}
