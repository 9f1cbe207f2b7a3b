//! Command and goal runners.
//!
//! `CommandRunner` wires the whole pipeline together for one user
//! command: context lookup, planning (with rule-based fallback),
//! scoped session acquisition, guided execution, and history save.
//! The goal path runs the bounded autonomous loop instead of a plan.

use std::sync::Arc;

use agent_flow::{AutonomousLoop, CommandStatus, ExecutionRecord, GuidedExecutor, LoopOutcome, LoopStatus};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use element_locator::ElementResolver;
use memory_center::MemoryStore;
use perceiver_screen::{OcrEngine, ScreenPerceiver};
use privacy_shield::Redactor;
use serde::{Deserialize, Serialize};
use task_planner::{fallback_plan, DecisionOracle, PlanningOracle};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::errors::WebPilotError;
use crate::session::{BrowserSession, SessionFactory};

/// Final status of one command, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Partial,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }
}

/// What a command run hands back to the transport layer. Screenshots
/// are sanitized and base64-encoded; raw frames never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: RunStatus,
    pub goal: String,
    pub execution_log: Vec<ExecutionRecord>,
    pub screenshots: Vec<String>,
    pub error: Option<String>,
}

/// Result of a goal pursued by the autonomous loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalResult {
    pub goal: String,
    #[serde(flatten)]
    pub outcome: LoopOutcome,
}

pub struct CommandRunner {
    factory: Arc<dyn SessionFactory>,
    store: Arc<dyn MemoryStore>,
    ocr: Arc<dyn OcrEngine>,
    planner: Option<Arc<dyn PlanningOracle>>,
    decider: Option<Arc<dyn DecisionOracle>>,
    config: AppConfig,
}

impl CommandRunner {
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        store: Arc<dyn MemoryStore>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            factory,
            store,
            ocr,
            planner: None,
            decider: None,
            config: AppConfig::default(),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn PlanningOracle>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_decider(mut self, decider: Arc<dyn DecisionOracle>) -> Self {
        self.decider = Some(decider);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Plan and execute one user command.
    pub async fn run_command(
        &self,
        user_id: &str,
        command: &str,
    ) -> Result<CommandResult, WebPilotError> {
        let context = self.store.get_user_context(user_id).await?;
        let context_json = serde_json::to_value(&context)
            .map_err(|e| WebPilotError::Config(e.to_string()))?;

        let plan = match &self.planner {
            Some(planner) => match planner.create_plan(command, &context_json).await {
                Ok(plan) if !plan.is_empty() => plan,
                Ok(_) => {
                    tracing::warn!("planner returned an empty plan, using fallback");
                    fallback_plan(command)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "planning oracle failed, using fallback");
                    fallback_plan(command)
                }
            },
            None => fallback_plan(command),
        };
        tracing::info!(goal = %plan.goal, steps = plan.steps.len(), "plan ready");

        let session = match BrowserSession::open(self.factory.clone()).await {
            Ok(session) => session,
            Err(err) => {
                let result = CommandResult {
                    status: RunStatus::Failed,
                    goal: plan.goal.clone(),
                    execution_log: Vec::new(),
                    screenshots: Vec::new(),
                    error: Some(err.to_string()),
                };
                self.save_history(user_id, command, &result.execution_log, result.status)
                    .await;
                return Ok(result);
            }
        };

        let executor = self.build_executor(&session);
        let outcome = executor.execute_plan(&plan).await;
        session.close().await;

        let status = match outcome.status {
            CommandStatus::Completed => RunStatus::Completed,
            CommandStatus::Partial => RunStatus::Partial,
        };
        self.save_history(user_id, command, &outcome.log, status).await;

        Ok(CommandResult {
            status,
            goal: plan.goal,
            execution_log: outcome.log,
            screenshots: outcome
                .screenshots
                .iter()
                .map(|frame| BASE64.encode(frame))
                .collect(),
            error: None,
        })
    }

    /// Pursue a goal with the autonomous loop.
    pub async fn run_goal(
        &self,
        user_id: &str,
        goal: &str,
        cancel: CancellationToken,
    ) -> Result<GoalResult, WebPilotError> {
        let decider = self.decider.clone().ok_or_else(|| {
            WebPilotError::Config("autonomous mode needs a decision oracle".into())
        })?;

        let session = BrowserSession::open(self.factory.clone()).await?;
        let driver = session.driver();
        let perceiver = Arc::new(ScreenPerceiver::new(self.ocr.clone()));
        let redactor = Arc::new(Redactor::with_mode(
            self.ocr.clone(),
            self.config.redaction_mode,
        ));
        let resolver = Arc::new(ElementResolver::new(perceiver.clone()));

        let agent = AutonomousLoop::new(driver, perceiver, redactor, resolver, decider)
            .with_max_iterations(self.config.max_iterations)
            .with_pacing(self.config.pacing());

        let outcome = agent.run(goal, cancel).await;
        session.close().await;

        let status = match outcome.status {
            LoopStatus::Completed => "completed",
            LoopStatus::MaxIterations => "max_iterations",
            LoopStatus::DecisionFailed => "decision_failed",
            LoopStatus::Cancelled => "cancelled",
        };
        let log_json = serde_json::to_value(&outcome.log).unwrap_or_default();
        if let Err(err) = self
            .store
            .save_execution(user_id, goal, log_json, status)
            .await
        {
            tracing::warn!(error = %err, "failed to save goal history");
        }

        Ok(GoalResult {
            goal: goal.to_string(),
            outcome,
        })
    }

    fn build_executor(&self, session: &BrowserSession) -> GuidedExecutor {
        let perceiver = Arc::new(ScreenPerceiver::new(self.ocr.clone()));
        let redactor = Arc::new(Redactor::with_mode(
            self.ocr.clone(),
            self.config.redaction_mode,
        ));
        let resolver = Arc::new(ElementResolver::new(perceiver.clone()));
        GuidedExecutor::new(session.driver(), perceiver, redactor, resolver)
            .with_pacing(self.config.pacing())
    }

    async fn save_history(
        &self,
        user_id: &str,
        command: &str,
        log: &[ExecutionRecord],
        status: RunStatus,
    ) {
        let log_json = serde_json::to_value(log).unwrap_or_default();
        if let Err(err) = self
            .store
            .save_execution(user_id, command, log_json, status.as_str())
            .await
        {
            tracing::warn!(error = %err, "failed to save execution history");
        }
    }
}
