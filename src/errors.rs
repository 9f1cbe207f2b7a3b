//! Top-level error type for the library surface.

use memory_center::StoreError;
use page_port::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebPilotError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The memory store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The browser session could not be acquired
    #[error("session error: {0}")]
    Session(#[from] PageError),
}
