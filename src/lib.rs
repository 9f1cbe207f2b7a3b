//! WebPilot - closed-loop browser automation core.
//!
//! A user command becomes a plan, the plan runs step by step against a
//! page driver with verification and selector healing, and every
//! screenshot is redacted before it reaches an oracle, the caller, or
//! storage. Goals without a plan go through a bounded
//! observe-decide-act loop instead.

pub mod config;
pub mod drivers;
pub mod errors;
pub mod runner;
pub mod session;

pub use config::AppConfig;
pub use errors::WebPilotError;
pub use runner::{CommandResult, CommandRunner, GoalResult, RunStatus};
pub use session::{BrowserSession, SessionFactory};
