//! Shared primitives for the WebPilot automation core.
//!
//! Everything here is plain data: ids, the closed action enum, plan and
//! step shapes, and the `Target` type that lets a click land on either a
//! structural selector or a raw pixel coordinate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shared error type for core-level validation.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("invalid step: {0}")]
    InvalidStep(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of browser actions a step may perform.
///
/// Unknown action strings fail deserialization; there is no silent
/// no-op fallback for unrecognized actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Navigate,
    Click,
    Type,
    Wait,
    Scroll,
    Screenshot,
    Press,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Navigate => "navigate",
            Action::Click => "click",
            Action::Type => "type",
            Action::Wait => "wait",
            Action::Scroll => "scroll",
            Action::Screenshot => "screenshot",
            Action::Press => "press",
        }
    }

    /// Whether this action addresses a page element and therefore needs
    /// target resolution before it can run.
    pub fn requires_target(&self) -> bool {
        matches!(self, Action::Click | Action::Type)
    }

    /// Actions that are followed by a screenshot capture in guided mode.
    pub fn triggers_screenshot(&self) -> bool {
        matches!(self, Action::Navigate | Action::Click | Action::Type)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an element-targeting action should land.
///
/// `Coords` carries the OCR last-resort result: a pixel position on the
/// current viewport rather than a structural selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Selector(String),
    Coords { x: u32, y: u32 },
}

impl Target {
    pub fn selector(s: impl Into<String>) -> Self {
        Target::Selector(s.into())
    }

    pub fn as_selector(&self) -> Option<&str> {
        match self {
            Target::Selector(s) => Some(s),
            Target::Coords { .. } => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Selector(s) => write!(f, "{}", s),
            Target::Coords { x, y } => write!(f, "coords:{},{}", x, y),
        }
    }
}

/// One action in a plan.
///
/// `target` may be a selector or a free-text description; the element
/// locator decides how to interpret it. `target` is the only field that
/// may be rewritten after creation, and only once, during selector
/// healing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub action: Action,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub description: String,
    /// Text the verifier looks for on screen to confirm this step landed.
    #[serde(default)]
    pub verification: String,
}

impl Step {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            target: String::new(),
            value: String::new(),
            sensitive: false,
            description: String::new(),
            verification: String::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_verification(mut self, verification: impl Into<String>) -> Self {
        self.verification = verification.into();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// A step whose action addresses an element must carry a target.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.action.requires_target() && self.target.trim().is_empty() {
            return Err(CoreError::InvalidStep(format!(
                "{} step has no target",
                self.action
            )));
        }
        Ok(())
    }
}

/// Ordered plan produced once per command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(goal: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            goal: goal.into(),
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
