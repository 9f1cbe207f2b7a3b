//! Oracle boundaries.
//!
//! Planning and decision-making live outside the core; these traits
//! are the only shape the orchestrator knows about them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webpilot_core_types::{Plan, Step};

use crate::errors::OracleError;

/// Turns a user command plus stored context into a plan, once per
/// command. Failure is recoverable: the caller falls back to the
/// rule-based planner.
#[async_trait]
pub trait PlanningOracle: Send + Sync {
    async fn create_plan(&self, command: &str, context: &Value) -> Result<Plan, OracleError>;
}

/// One decision of the autonomous loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub goal_achieved: bool,
    pub next_action: Option<Step>,
    pub reasoning: String,
}

/// Decides the next action toward a goal from the current page state
/// and a redacted screenshot. Failure here is fatal to the loop: a
/// broken decision channel cannot safely keep acting blind.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(
        &self,
        goal: &str,
        page_info: &Value,
        screenshot: &[u8],
    ) -> Result<Decision, OracleError>;
}
