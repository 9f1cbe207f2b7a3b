//! Error types for the redaction pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShieldError {
    /// Screenshot bytes could not be decoded or re-encoded
    #[error("image processing failed: {0}")]
    Image(String),

    /// Sensitive region detection failed
    #[error("region detection failed: {0}")]
    Detection(String),
}
