//! Error types for page driver operations

use thiserror::Error;

/// Failures a page operation may report.
///
/// All variants are recoverable at the step level: the orchestrator
/// records them and moves on, it never aborts the whole command.
#[derive(Debug, Error, Clone)]
pub enum PageError {
    /// Navigation did not settle within the driver's deadline
    #[error("navigation timeout: {0}")]
    NavTimeout(String),

    /// Target selector matched nothing on the live page
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Element exists but cannot be interacted with
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// A coordinate click landed outside the viewport
    #[error("coordinates out of bounds: {0}")]
    OutOfBounds(String),

    /// Screenshot capture failed
    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),

    /// Driver transport or protocol failure
    #[error("driver I/O error: {0}")]
    DriverIo(String),
}

impl PageError {
    /// Whether retrying the same operation against an alternative
    /// target could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PageError::ElementNotFound(_)
                | PageError::NotInteractable(_)
                | PageError::NavTimeout(_)
        )
    }
}
