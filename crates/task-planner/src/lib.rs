//! Planning and decision boundaries.
//!
//! The planning oracle turns a command into a [`Plan`] once; the
//! decision oracle steers the autonomous loop one action at a time.
//! When planning fails, [`rule_based::fallback_plan`] still produces
//! something executable.
//!
//! [`Plan`]: webpilot_core_types::Plan

pub mod errors;
pub mod oracle;
pub mod rule_based;

pub use errors::OracleError;
pub use oracle::{Decision, DecisionOracle, PlanningOracle};
pub use rule_based::fallback_plan;
