//! Guided plan execution.
//!
//! Steps run in order with per-step verify/heal/retry. A failed step
//! never aborts the plan: it is recorded, the rest of the plan runs,
//! and the final status degrades to partial. Raw screenshots pass
//! through the redactor before anything else sees them.

use std::sync::Arc;
use std::time::Duration;

use element_locator::ElementResolver;
use page_port::{PageDriver, ScrollDirection};
use perceiver_screen::{ScreenAnalysis, ScreenPerceiver};
use privacy_shield::Redactor;
use webpilot_core_types::{Action, Plan, Step, Target};

use crate::errors::StepError;
use crate::pacing::HumanPacing;
use crate::types::{CommandStatus, ExecutionOutcome, ExecutionRecord, StepStatus};

pub struct GuidedExecutor {
    driver: Arc<dyn PageDriver>,
    perceiver: Arc<ScreenPerceiver>,
    redactor: Arc<Redactor>,
    resolver: Arc<ElementResolver>,
    pacing: HumanPacing,
}

/// What one attempt at a step produced.
struct AttemptResult {
    resolved_strategy: Option<String>,
    verified: bool,
}

impl GuidedExecutor {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        perceiver: Arc<ScreenPerceiver>,
        redactor: Arc<Redactor>,
        resolver: Arc<ElementResolver>,
    ) -> Self {
        Self {
            driver,
            perceiver,
            redactor,
            resolver,
            pacing: HumanPacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: HumanPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Execute every step of the plan in order.
    pub async fn execute_plan(&self, plan: &Plan) -> ExecutionOutcome {
        let mut log = Vec::with_capacity(plan.steps.len());
        let mut screenshots = Vec::new();
        let mut last_frame: Option<Vec<u8>> = None;
        let mut any_failed = false;

        for (index, step) in plan.steps.iter().enumerate() {
            self.pacing.pause_between_actions().await;
            let mut step = step.clone();
            let record = self
                .run_step(index, &mut step, &mut screenshots, &mut last_frame)
                .await;
            if record.status == StepStatus::Failed {
                any_failed = true;
            }
            log.push(record);
        }

        ExecutionOutcome {
            status: if any_failed {
                CommandStatus::Partial
            } else {
                CommandStatus::Completed
            },
            log,
            screenshots,
        }
    }

    /// Resolve and act once, without the verify/heal pass. The
    /// autonomous loop uses this: the oracle re-observes every
    /// iteration and judges progress itself, and replaying a
    /// side-effecting action after a verification mismatch would
    /// duplicate it on the page. The candidate chain still applies
    /// when the action itself fails.
    pub async fn run_action(
        &self,
        step: &Step,
        last_frame: &mut Option<Vec<u8>>,
    ) -> Result<Option<String>, StepError> {
        self.pacing.pause_between_actions().await;
        if step.action.requires_target() {
            let mut tried = Vec::new();
            let strategy = self
                .act_on_target(step, last_frame.as_deref(), &mut tried)
                .await?;
            Ok(Some(strategy))
        } else {
            let mut screenshots = Vec::new();
            self.act_untargeted(step, &mut screenshots, last_frame)
                .await?;
            Ok(None)
        }
    }

    /// One step: attempt, and on failure substitute an untried
    /// candidate into the target and retry exactly once.
    async fn run_step(
        &self,
        index: usize,
        step: &mut Step,
        screenshots: &mut Vec<Vec<u8>>,
        last_frame: &mut Option<Vec<u8>>,
    ) -> ExecutionRecord {
        let action_name = step.action.name();
        let mut tried: Vec<Target> = Vec::new();

        match self.attempt(step, screenshots, last_frame, &mut tried).await {
            Ok(result) if result.verified => {
                return ExecutionRecord::new(
                    index,
                    action_name,
                    StepStatus::Success,
                    result.resolved_strategy,
                );
            }
            Ok(_) => {
                tracing::warn!(step = index, action = action_name, "verification failed");
            }
            Err(err) => {
                tracing::warn!(step = index, action = action_name, error = %err, "step failed");
            }
        }

        if !step.target.trim().is_empty() {
            if let Some(candidate) = self.untried_candidate(step, last_frame, &tried).await {
                tracing::info!(
                    step = index,
                    candidate = %candidate,
                    "healing: retrying with substituted target"
                );
                step.target = candidate.to_string();
                match self.attempt(step, screenshots, last_frame, &mut tried).await {
                    Ok(result) if result.verified => {
                        return ExecutionRecord::new(
                            index,
                            action_name,
                            StepStatus::Success,
                            result.resolved_strategy,
                        );
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(step = index, error = %err, "healing retry failed");
                    }
                }
            }
        }

        ExecutionRecord::new(index, action_name, StepStatus::Failed, None)
    }

    /// Resolve (if needed), act, screenshot, redact, perceive, verify.
    async fn attempt(
        &self,
        step: &Step,
        screenshots: &mut Vec<Vec<u8>>,
        last_frame: &mut Option<Vec<u8>>,
        tried: &mut Vec<Target>,
    ) -> Result<AttemptResult, StepError> {
        let resolved_strategy = if step.action.requires_target() {
            Some(self.act_on_target(step, last_frame.as_deref(), tried).await?)
        } else {
            self.act_untargeted(step, screenshots, last_frame).await?;
            None
        };

        let verified = if step.action.triggers_screenshot() {
            let analysis = self.observe(screenshots, last_frame).await?;
            verify(step, &analysis)
        } else {
            true
        };

        Ok(AttemptResult {
            resolved_strategy,
            verified,
        })
    }

    /// Try each candidate for the step's target greedily; first
    /// success wins and names the strategy that produced it.
    async fn act_on_target(
        &self,
        step: &Step,
        frame: Option<&[u8]>,
        tried: &mut Vec<Target>,
    ) -> Result<String, StepError> {
        let candidates = self.resolver.resolve(&step.target, frame).await;
        if candidates.is_empty() {
            return Err(StepError::Resolution(step.target.clone()));
        }

        for attempt in candidates {
            if tried.contains(&attempt.candidate) {
                continue;
            }
            tried.push(attempt.candidate.clone());
            match self.perform(step, &attempt.candidate).await {
                Ok(()) => return Ok(attempt.strategy.name().to_string()),
                Err(err) => {
                    tracing::debug!(
                        strategy = attempt.strategy.name(),
                        candidate = %attempt.candidate,
                        error = %err,
                        "candidate failed"
                    );
                }
            }
        }
        Err(StepError::Resolution(step.target.clone()))
    }

    async fn perform(&self, step: &Step, target: &Target) -> Result<(), StepError> {
        match step.action {
            Action::Click => self.driver.click(target).await?,
            Action::Type => {
                let selector = target
                    .as_selector()
                    .ok_or_else(|| StepError::InvalidStep("type needs a selector".into()))?;
                // Sensitive values go in as one write, without the
                // per-keystroke cadence.
                if !step.sensitive {
                    self.pacing.typing_pause(step.value.chars().count()).await;
                }
                self.driver.type_text(selector, &step.value).await?;
            }
            _ => {
                return Err(StepError::InvalidStep(format!(
                    "{} does not address an element",
                    step.action
                )))
            }
        }
        Ok(())
    }

    async fn act_untargeted(
        &self,
        step: &Step,
        screenshots: &mut Vec<Vec<u8>>,
        last_frame: &mut Option<Vec<u8>>,
    ) -> Result<(), StepError> {
        match step.action {
            Action::Navigate => self.driver.navigate(&step.value).await?,
            Action::Wait => {
                let seconds = step.value.parse::<f64>().unwrap_or(1.0);
                tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            }
            Action::Scroll => {
                let raw = if step.target.is_empty() {
                    &step.value
                } else {
                    &step.target
                };
                self.driver.scroll(ScrollDirection::parse(raw)).await?;
            }
            Action::Press => self.driver.press_key(&step.value).await?,
            Action::Screenshot => {
                // Explicit capture: redact and keep the frame, no
                // verification attached.
                self.observe(screenshots, last_frame).await?;
            }
            Action::Click | Action::Type => {
                return Err(StepError::InvalidStep(format!(
                    "{} requires a target",
                    step.action
                )))
            }
        }
        Ok(())
    }

    /// Capture, redact, record, and analyze one frame.
    async fn observe(
        &self,
        screenshots: &mut Vec<Vec<u8>>,
        last_frame: &mut Option<Vec<u8>>,
    ) -> Result<ScreenAnalysis, StepError> {
        let raw = self.driver.screenshot().await?;
        let sanitized = self.redactor.redact(&raw).await?;
        let analysis = self
            .perceiver
            .analyze(&sanitized, last_frame.as_deref())
            .await;
        screenshots.push(sanitized.clone());
        *last_frame = Some(sanitized);
        Ok(analysis)
    }

    /// Find the first resolution candidate not yet tried for this
    /// step, for the healing retry.
    async fn untried_candidate(
        &self,
        step: &Step,
        last_frame: &Option<Vec<u8>>,
        tried: &[Target],
    ) -> Option<Target> {
        self.resolver
            .resolve(&step.target, last_frame.as_deref())
            .await
            .into_iter()
            .map(|attempt| attempt.candidate)
            .find(|candidate| !tried.contains(candidate))
    }
}

/// A step verifies when its declared verification text shows up on
/// screen, or when the action-specific heuristic holds.
fn verify(step: &Step, analysis: &ScreenAnalysis) -> bool {
    let text = analysis.extracted_text.to_lowercase();

    let verification = step.verification.trim().to_lowercase();
    if !verification.is_empty() && text.contains(&verification) {
        return true;
    }

    match step.action {
        Action::Navigate => analysis.page_loaded,
        Action::Click => analysis.screen_changed,
        Action::Type => !step.value.is_empty() && text.contains(&step.value.to_lowercase()),
        _ => true,
    }
}
