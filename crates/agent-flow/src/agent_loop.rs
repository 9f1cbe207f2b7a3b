//! Bounded autonomous loop.
//!
//! Observe, decide, act, repeat - at most `max_iterations` times. The
//! decision oracle is consulted once per iteration with the current
//! page state and a redacted frame; its failure is fatal to the loop
//! because a broken decision channel cannot safely keep acting blind.
//! A cancellation token is checked before observing and before acting.

use std::sync::Arc;

use chrono::Utc;
use element_locator::ElementResolver;
use page_port::PageDriver;
use perceiver_screen::ScreenPerceiver;
use privacy_shield::Redactor;
use task_planner::DecisionOracle;
use tokio_util::sync::CancellationToken;
use webpilot_core_types::Step;

use crate::executor::GuidedExecutor;
use crate::pacing::HumanPacing;
use crate::types::{IterationRecord, LoopOutcome, LoopPhase, LoopStatus};

pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

pub struct AutonomousLoop {
    driver: Arc<dyn PageDriver>,
    redactor: Arc<Redactor>,
    executor: GuidedExecutor,
    oracle: Arc<dyn DecisionOracle>,
    max_iterations: u32,
}

impl AutonomousLoop {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        perceiver: Arc<ScreenPerceiver>,
        redactor: Arc<Redactor>,
        resolver: Arc<ElementResolver>,
        oracle: Arc<dyn DecisionOracle>,
    ) -> Self {
        let executor = GuidedExecutor::new(driver.clone(), perceiver, redactor.clone(), resolver)
            .with_pacing(HumanPacing::disabled());
        Self {
            driver,
            redactor,
            executor,
            oracle,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_pacing(mut self, pacing: HumanPacing) -> Self {
        self.executor = self.executor.with_pacing(pacing);
        self
    }

    /// Run the loop until goal-achieved, the iteration ceiling, a
    /// decision failure, or cancellation.
    pub async fn run(&self, goal: &str, cancel: CancellationToken) -> LoopOutcome {
        let mut log = Vec::new();
        let mut iteration: u32 = 0;
        let mut last_frame: Option<Vec<u8>> = None;

        while iteration < self.max_iterations {
            iteration += 1;

            if cancel.is_cancelled() {
                return self.finish(LoopStatus::Cancelled, iteration, log);
            }

            tracing::debug!(iteration, goal, phase = ?LoopPhase::Observing, "loop iteration");
            let (frame, page_info) = match self.observe(&mut last_frame).await {
                Some(observed) => observed,
                None => {
                    // Observation degrades rather than aborting; the
                    // oracle decides blind on page info alone.
                    (Vec::new(), page_port::PageInfo::default())
                }
            };

            tracing::debug!(iteration, phase = ?LoopPhase::Deciding, "consulting oracle");
            let page_json = serde_json::json!({
                "url": page_info.url,
                "title": page_info.title,
            });
            let decision = match self.oracle.decide(goal, &page_json, &frame).await {
                Ok(decision) => decision,
                Err(err) => {
                    tracing::error!(iteration, error = %err, "decision oracle failed");
                    // The failed iteration still lands on the log.
                    log.push(IterationRecord {
                        iteration,
                        reasoning: format!("decision failed: {}", err),
                        action: None,
                        goal_achieved: false,
                        timestamp_utc: Utc::now(),
                    });
                    return self.finish(LoopStatus::DecisionFailed, iteration, log);
                }
            };

            log.push(IterationRecord {
                iteration,
                reasoning: decision.reasoning.clone(),
                action: decision
                    .next_action
                    .as_ref()
                    .map(|step| step.action.name().to_string()),
                goal_achieved: decision.goal_achieved,
                timestamp_utc: Utc::now(),
            });

            if decision.goal_achieved {
                return self.finish(LoopStatus::Completed, iteration, log);
            }

            if cancel.is_cancelled() {
                return self.finish(LoopStatus::Cancelled, iteration, log);
            }

            if let Some(step) = decision.next_action {
                tracing::debug!(iteration, phase = ?LoopPhase::Acting, action = step.action.name(), "acting");
                self.act(&step, &mut last_frame).await;
            }
        }

        self.finish(LoopStatus::MaxIterations, self.max_iterations, log)
    }

    async fn observe(
        &self,
        last_frame: &mut Option<Vec<u8>>,
    ) -> Option<(Vec<u8>, page_port::PageInfo)> {
        let raw = match self.driver.screenshot().await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "observation screenshot failed");
                return None;
            }
        };
        let sanitized = match self.redactor.redact(&raw).await {
            Ok(sanitized) => sanitized,
            Err(err) => {
                tracing::warn!(error = %err, "redaction blocked observation frame");
                return None;
            }
        };
        *last_frame = Some(sanitized.clone());

        let page_info = self.driver.page_info().await.unwrap_or_default();
        Some((sanitized, page_info))
    }

    /// Execute one decided step through the shared resolve/act chain.
    /// No verification and no healing retry here - the oracle
    /// re-observes every iteration and judges progress itself, and
    /// replaying a side-effecting action on a verification mismatch
    /// would duplicate it on the page.
    async fn act(&self, step: &Step, last_frame: &mut Option<Vec<u8>>) {
        match self.executor.run_action(step, last_frame).await {
            Ok(strategy) => {
                tracing::debug!(
                    action = step.action.name(),
                    strategy = strategy.as_deref(),
                    "loop action done"
                );
            }
            Err(err) => {
                tracing::warn!(action = step.action.name(), error = %err, "loop action failed");
            }
        }
    }

    fn finish(&self, status: LoopStatus, iterations: u32, log: Vec<IterationRecord>) -> LoopOutcome {
        tracing::info!(?status, iterations, "autonomous loop finished");
        LoopOutcome {
            status,
            iterations,
            log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use perceiver_screen::{OcrEngine, PerceiverError, TextBox};
    use pretty_assertions::assert_eq;
    use task_planner::{Decision, OracleError};
    use webpilot_core_types::{Action, Target};

    struct EmptyOcr;

    #[async_trait]
    impl OcrEngine for EmptyOcr {
        async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
            Ok(String::new())
        }

        async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct QuietDriver {
        typed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageDriver for QuietDriver {
        async fn navigate(&self, _url: &str) -> Result<(), page_port::PageError> {
            Ok(())
        }

        async fn click(&self, _target: &Target) -> Result<(), page_port::PageError> {
            Ok(())
        }

        async fn type_text(&self, selector: &str, _text: &str) -> Result<(), page_port::PageError> {
            self.typed.lock().push(selector.to_string());
            Ok(())
        }

        async fn scroll(
            &self,
            _direction: page_port::ScrollDirection,
        ) -> Result<(), page_port::PageError> {
            Ok(())
        }

        async fn press_key(&self, _key: &str) -> Result<(), page_port::PageError> {
            Ok(())
        }

        async fn screenshot(&self) -> Result<Vec<u8>, page_port::PageError> {
            Ok(b"frame".to_vec())
        }

        async fn read_visible_text(&self) -> Result<String, page_port::PageError> {
            Ok(String::new())
        }

        async fn page_info(&self) -> Result<page_port::PageInfo, page_port::PageError> {
            Ok(page_port::PageInfo {
                url: "https://example.com".into(),
                title: "Example".into(),
            })
        }
    }

    /// Oracle scripted with a fixed sequence of decisions; repeats the
    /// last one when exhausted. Counts calls.
    struct ScriptedOracle {
        decisions: Vec<Result<Decision, ()>>,
        calls: Mutex<u32>,
    }

    impl ScriptedOracle {
        fn always_unfinished() -> Self {
            Self {
                decisions: vec![Ok(Decision {
                    goal_achieved: false,
                    next_action: Some(Step::new(Action::Scroll).with_value("down")),
                    reasoning: "keep scrolling".into(),
                })],
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl DecisionOracle for ScriptedOracle {
        async fn decide(
            &self,
            _goal: &str,
            _page_info: &serde_json::Value,
            _screenshot: &[u8],
        ) -> Result<Decision, OracleError> {
            let mut calls = self.calls.lock();
            let index = (*calls as usize).min(self.decisions.len() - 1);
            *calls += 1;
            self.decisions[index]
                .clone()
                .map_err(|_| OracleError::Unavailable("scripted failure".into()))
        }
    }

    fn agent_on(driver: Arc<QuietDriver>, oracle: Arc<ScriptedOracle>) -> AutonomousLoop {
        let ocr = Arc::new(EmptyOcr);
        let perceiver = Arc::new(ScreenPerceiver::new(ocr.clone()));
        AutonomousLoop::new(
            driver,
            perceiver.clone(),
            Arc::new(Redactor::new(ocr)),
            Arc::new(ElementResolver::new(perceiver)),
            oracle,
        )
    }

    fn agent(oracle: Arc<ScriptedOracle>) -> AutonomousLoop {
        agent_on(Arc::new(QuietDriver::default()), oracle)
    }

    #[tokio::test]
    async fn goal_achieved_completes() {
        let oracle = Arc::new(ScriptedOracle {
            decisions: vec![
                Ok(Decision {
                    goal_achieved: false,
                    next_action: Some(Step::new(Action::Scroll).with_value("down")),
                    reasoning: "not there yet".into(),
                }),
                Ok(Decision {
                    goal_achieved: true,
                    next_action: None,
                    reasoning: "done".into(),
                }),
            ],
            calls: Mutex::new(0),
        });
        let outcome = agent(oracle.clone())
            .run("find the pricing page", CancellationToken::new())
            .await;

        assert_eq!(outcome.status, LoopStatus::Completed);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.log.len(), 2);
        assert!(outcome.log[1].goal_achieved);
    }

    #[tokio::test]
    async fn iteration_ceiling_bounds_decision_calls() {
        let oracle = Arc::new(ScriptedOracle::always_unfinished());
        let outcome = agent(oracle.clone())
            .with_max_iterations(4)
            .run("impossible goal", CancellationToken::new())
            .await;

        assert_eq!(outcome.status, LoopStatus::MaxIterations);
        assert_eq!(outcome.iterations, 4);
        assert_eq!(oracle.call_count(), 4);
        assert_eq!(outcome.log.len(), 4);
    }

    #[tokio::test]
    async fn oracle_failure_is_fatal() {
        let oracle = Arc::new(ScriptedOracle {
            decisions: vec![Err(())],
            calls: Mutex::new(0),
        });
        let outcome = agent(oracle)
            .run("anything", CancellationToken::new())
            .await;

        assert_eq!(outcome.status, LoopStatus::DecisionFailed);
        assert_eq!(outcome.iterations, 1);
        // The failed iteration is still logged.
        assert_eq!(outcome.log.len(), 1);
        assert!(outcome.log[0].reasoning.contains("decision failed"));
        assert!(outcome.log[0].action.is_none());
        assert!(!outcome.log[0].goal_achieved);
    }

    #[tokio::test]
    async fn decided_action_runs_once_despite_unverifiable_screen() {
        let driver = Arc::new(QuietDriver::default());
        let oracle = Arc::new(ScriptedOracle {
            decisions: vec![
                Ok(Decision {
                    goal_achieved: false,
                    next_action: Some(
                        Step::new(Action::Type).with_target("#q").with_value("cats"),
                    ),
                    reasoning: "type the query".into(),
                }),
                Ok(Decision {
                    goal_achieved: true,
                    next_action: None,
                    reasoning: "done".into(),
                }),
            ],
            calls: Mutex::new(0),
        });

        let outcome = agent_on(driver.clone(), oracle)
            .run("search for cats", CancellationToken::new())
            .await;

        assert_eq!(outcome.status, LoopStatus::Completed);
        // Empty OCR means the typed value never shows up on screen,
        // but the type action must not be replayed with an alternative
        // selector - the oracle re-observes on the next iteration.
        assert_eq!(driver.typed.lock().clone(), vec!["#q".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_loop() {
        let oracle = Arc::new(ScriptedOracle::always_unfinished());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = agent(oracle.clone()).run("anything", cancel).await;

        assert_eq!(outcome.status, LoopStatus::Cancelled);
        assert_eq!(oracle.call_count(), 0);
    }
}
