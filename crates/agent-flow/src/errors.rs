//! Step-level failure causes.
//!
//! None of these escape the orchestrator as process faults; each is
//! converted into a failed record on the execution log.

use page_port::PageError;
use privacy_shield::ShieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    /// No candidate handle worked for the target
    #[error("no candidate resolved for target '{0}'")]
    Resolution(String),

    /// The page capability call failed
    #[error("page action failed: {0}")]
    Action(#[from] PageError),

    /// Strict-mode redaction refused to emit a screenshot
    #[error("redaction blocked screenshot: {0}")]
    Redaction(#[from] ShieldError),

    /// The step itself is malformed (missing target or value)
    #[error("invalid step: {0}")]
    InvalidStep(String),
}
