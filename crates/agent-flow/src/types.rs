//! Orchestration result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one step attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed,
}

/// One entry of the execution log, appended per step regardless of
/// outcome. The orchestrator is the sole writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub step_index: usize,
    pub action: String,
    pub status: StepStatus,
    /// Strategy that produced the working handle, when one did.
    pub resolved_strategy: Option<String>,
    pub timestamp_utc: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(
        step_index: usize,
        action: &str,
        status: StepStatus,
        resolved_strategy: Option<String>,
    ) -> Self {
        Self {
            step_index,
            action: action.to_string(),
            status,
            resolved_strategy,
            timestamp_utc: Utc::now(),
        }
    }
}

/// Final status of a guided plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// Every step succeeded and verified
    Completed,
    /// At least one step failed; the rest of the plan still ran
    Partial,
}

/// Result of guided plan execution. Screenshots are sanitized; raw
/// frames never leave the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub log: Vec<ExecutionRecord>,
    pub screenshots: Vec<Vec<u8>>,
}

/// Terminal status of the autonomous loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    /// The decision oracle asserted goal-achieved
    Completed,
    /// Iteration ceiling reached without goal-achieved
    MaxIterations,
    /// The decision oracle itself failed; acting blind is unsafe
    DecisionFailed,
    /// An external cancel signal stopped the loop
    Cancelled,
}

/// Phase of the loop state machine, logged per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Observing,
    Deciding,
    Acting,
    Done,
}

/// One loop iteration, appended unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub reasoning: String,
    pub action: Option<String>,
    pub goal_achieved: bool,
    pub timestamp_utc: DateTime<Utc>,
}

/// Result of an autonomous loop run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopOutcome {
    pub status: LoopStatus,
    pub iterations: u32,
    pub log: Vec<IterationRecord>,
}
