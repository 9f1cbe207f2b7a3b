//! Execution orchestration.
//!
//! Two entry points: [`GuidedExecutor::execute_plan`] runs an oracle-
//! or rule-produced plan step by step with verify/heal/retry, and
//! [`AutonomousLoop::run`] pursues a goal through a bounded
//! observe-decide-act cycle. Both convert every step-level failure
//! into a log record; neither lets one escape as a process fault.

pub mod agent_loop;
pub mod errors;
pub mod executor;
pub mod pacing;
pub mod types;

pub use agent_loop::{AutonomousLoop, DEFAULT_MAX_ITERATIONS};
pub use errors::StepError;
pub use executor::GuidedExecutor;
pub use pacing::HumanPacing;
pub use types::{
    CommandStatus, ExecutionOutcome, ExecutionRecord, IterationRecord, LoopOutcome, LoopPhase,
    LoopStatus, StepStatus,
};
