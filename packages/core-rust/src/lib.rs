//! AAKaaS Core: target vector records, operation status, poll budgets, and addon descriptors.

pub mod budget;
pub mod descriptor;
pub mod request;
pub mod scope;
pub mod secret;
pub mod status;
pub mod target_vector;

pub use budget::{BudgetError, PollBudget};
pub use descriptor::{AddonDescriptor, AddonRepository, DescriptorError};
pub use request::{OperationHandle, PublishRequest};
pub use scope::{ScopeError, TargetVectorScope};
pub use secret::{Credentials, Secret, MASK};
pub use status::{OperationStatus, StatusReport};
pub use target_vector::{ODataEnvelope, TargetVector};
