//! AAKaaS Step: triggers publication of a target vector and polls until it completes.
//!
//! The crate is organized leaf-first:
//!
//! 1. **Clock** (`clock`): monotonic time and sleeping, injectable for tests
//! 2. **Client** (`client`): `OperationClient` trait and the AAKaaS HTTP client
//! 3. **Poller** (`poller`): bounded submit -> poll -> resolve state machine
//! 4. **Step** (`step`): configuration, logging, telemetry, and the entry point

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod observer;
pub mod poller;
pub mod step;
pub mod telemetry;

pub use client::{AakaasClient, Connection, OperationClient};
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{LogFormat, StepArgs, StepConfig, STEP_NAME};
pub use error::{ClientError, ErrorCategory, StepError};
pub use observer::{PollObserver, TracingObserver};
pub use poller::{BoundedPoller, PollResult};
pub use step::{execute, publish_target_vector, run_step};
pub use telemetry::StepReport;
