//! End-to-end pipeline tests over the simulated driver.

use std::sync::Arc;

use async_trait::async_trait;
use memory_center::{InMemoryStore, MemoryStore};
use perceiver_screen::{OcrEngine, PerceiverError, TextBox};
use pretty_assertions::assert_eq;
use task_planner::{Decision, DecisionOracle, OracleError, PlanningOracle};
use tokio_util::sync::CancellationToken;
use webpilot::drivers::SimulatedSessionFactory;
use webpilot::{AppConfig, CommandRunner, RunStatus};
use webpilot_core_types::{Action, Plan, Step};

/// OCR scripted to show whatever a passing verification needs.
struct ScriptedOcr {
    screen_text: String,
}

#[async_trait]
impl OcrEngine for ScriptedOcr {
    async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
        Ok(self.screen_text.clone())
    }

    async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
        Ok(Vec::new())
    }
}

struct FailingPlanner;

#[async_trait]
impl PlanningOracle for FailingPlanner {
    async fn create_plan(
        &self,
        _command: &str,
        _context: &serde_json::Value,
    ) -> Result<Plan, OracleError> {
        Err(OracleError::Unavailable("no backend".into()))
    }
}

struct CountdownDecider {
    remaining: parking_lot::Mutex<u32>,
}

#[async_trait]
impl DecisionOracle for CountdownDecider {
    async fn decide(
        &self,
        _goal: &str,
        _page_info: &serde_json::Value,
        _screenshot: &[u8],
    ) -> Result<Decision, OracleError> {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return Ok(Decision {
                goal_achieved: true,
                next_action: None,
                reasoning: "goal reached".into(),
            });
        }
        *remaining -= 1;
        Ok(Decision {
            goal_achieved: false,
            next_action: Some(Step::new(Action::Scroll).with_value("down")),
            reasoning: "scrolling toward the goal".into(),
        })
    }
}

fn fast_config() -> AppConfig {
    AppConfig {
        action_delay_min_ms: 0,
        action_delay_max_ms: 1,
        keystroke_delay_min_ms: 0,
        keystroke_delay_max_ms: 1,
        ..AppConfig::default()
    }
}

fn runner(store: Arc<InMemoryStore>, screen_text: &str) -> CommandRunner {
    CommandRunner::new(
        Arc::new(SimulatedSessionFactory),
        store,
        Arc::new(ScriptedOcr {
            screen_text: screen_text.to_string(),
        }),
    )
    .with_config(fast_config())
}

const RESULTS_SCREEN: &str =
    "Google search results displayed for cats - query entered in search box, \
     plenty of results follow below this line of text";

#[tokio::test]
async fn google_command_runs_fallback_plan_end_to_end() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(store.clone(), RESULTS_SCREEN);

    let result = runner
        .run_command("u1", "Search Google for cats")
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.goal, "Search Google for: cats");
    assert_eq!(result.execution_log.len(), 3);
    // navigate, type and click each produce one sanitized frame.
    assert_eq!(result.screenshots.len(), 3);
    assert!(result.error.is_none());

    let context = store.get_user_context("u1").await.unwrap();
    assert_eq!(context.recent_history.len(), 1);
    assert_eq!(context.recent_history[0].status, "completed");
}

#[tokio::test]
async fn planner_failure_falls_back_to_rules() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(store, RESULTS_SCREEN).with_planner(Arc::new(FailingPlanner));

    let result = runner
        .run_command("u1", "Search Google for cats")
        .await
        .unwrap();

    // The failed oracle never aborts the command.
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.execution_log.len(), 3);
}

#[tokio::test]
async fn unverifiable_step_reports_partial() {
    let store = Arc::new(InMemoryStore::new());
    // Blank screen: navigate cannot verify (no text, page not loaded).
    let runner = runner(store.clone(), "");

    let result = runner.run_command("u1", "go to example.com").await.unwrap();

    assert_eq!(result.status, RunStatus::Partial);
    let context = store.get_user_context("u1").await.unwrap();
    assert_eq!(context.recent_history[0].status, "partial");
}

#[tokio::test]
async fn goal_loop_completes_and_saves_history() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(store.clone(), RESULTS_SCREEN).with_decider(Arc::new(CountdownDecider {
        remaining: parking_lot::Mutex::new(2),
    }));

    let result = runner
        .run_goal("u1", "find cat pictures", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome.status, agent_flow::LoopStatus::Completed);
    assert_eq!(result.outcome.iterations, 3);

    let context = store.get_user_context("u1").await.unwrap();
    assert_eq!(context.recent_history[0].status, "completed");
}

#[tokio::test]
async fn cancelled_goal_stops_immediately() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(store.clone(), RESULTS_SCREEN).with_decider(Arc::new(CountdownDecider {
        remaining: parking_lot::Mutex::new(u32::MAX),
    }));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = runner.run_goal("u1", "anything", cancel).await.unwrap();

    assert_eq!(result.outcome.status, agent_flow::LoopStatus::Cancelled);
    assert!(result.outcome.log.is_empty());

    let context = store.get_user_context("u1").await.unwrap();
    assert_eq!(context.recent_history[0].status, "cancelled");
}

#[tokio::test]
async fn goal_without_decider_is_a_config_error() {
    let store = Arc::new(InMemoryStore::new());
    let runner = runner(store, RESULTS_SCREEN);

    let err = runner
        .run_goal("u1", "anything", CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("decision oracle"));
}
