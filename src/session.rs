//! Scoped browser sessions.
//!
//! One session per in-flight command, acquired at command start and
//! released on every exit path. Sessions are never shared process-wide;
//! the runner owns exactly one for the duration of a command.

use std::sync::Arc;

use async_trait::async_trait;
use page_port::{PageDriver, PageError};
use webpilot_core_types::SessionId;

/// Opens and tears down page drivers. A production implementation
/// launches a browser; tests hand out scripted drivers.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn PageDriver>, PageError>;

    /// Release whatever `open` acquired. Default is a no-op for
    /// drivers without external resources.
    async fn close(&self, session: &SessionId) -> Result<(), PageError> {
        let _ = session;
        Ok(())
    }
}

/// A live browser session bound to one command execution.
pub struct BrowserSession {
    id: SessionId,
    driver: Arc<dyn PageDriver>,
    factory: Arc<dyn SessionFactory>,
    closed: bool,
}

impl BrowserSession {
    pub async fn open(factory: Arc<dyn SessionFactory>) -> Result<Self, PageError> {
        let driver = factory.open().await?;
        let id = SessionId::new();
        tracing::debug!(session = %id, "browser session opened");
        Ok(Self {
            id,
            driver,
            factory,
            closed: false,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn driver(&self) -> Arc<dyn PageDriver> {
        self.driver.clone()
    }

    /// Tear the session down. Callers hit this on every exit path,
    /// success or failure.
    pub async fn close(mut self) {
        if let Err(err) = self.factory.close(&self.id).await {
            tracing::warn!(session = %self.id, error = %err, "session teardown failed");
        }
        self.closed = true;
        tracing::debug!(session = %self.id, "browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            // An early return skipped the explicit close.
            tracing::warn!(session = %self.id, "browser session dropped without close");
        }
    }
}
