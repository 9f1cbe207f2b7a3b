//! Built-in stand-in drivers.
//!
//! Real CDP/WebDriver wiring lives behind the [`PageDriver`] boundary
//! and out of this crate. The simulated driver here backs the CLI's
//! dry-run mode and doubles as a harness for exercising the full
//! pipeline without a browser.

use std::sync::Arc;

use async_trait::async_trait;
use page_port::{PageDriver, PageError, PageInfo, ScrollDirection};
use parking_lot::Mutex;
use perceiver_screen::{OcrEngine, PerceiverError, TextBox};
use webpilot_core_types::{SessionId, Target};

use crate::session::SessionFactory;

/// Driver that records actions and fabricates page state instead of
/// touching a browser.
#[derive(Default)]
pub struct SimulatedDriver {
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    url: String,
    actions: Vec<String>,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the driver was asked to do, in order.
    pub fn action_log(&self) -> Vec<String> {
        self.state.lock().actions.clone()
    }

    fn record(&self, action: String) {
        tracing::info!(action = %action, "simulated driver");
        self.state.lock().actions.push(action);
    }
}

#[async_trait]
impl PageDriver for SimulatedDriver {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let url = if url.starts_with("http") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        self.record(format!("navigate {}", url));
        self.state.lock().url = url;
        Ok(())
    }

    async fn click(&self, target: &Target) -> Result<(), PageError> {
        self.record(format!("click {}", target));
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), PageError> {
        self.record(format!("type into {} ({} chars)", selector, text.len()));
        Ok(())
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<(), PageError> {
        self.record(format!("scroll {:?}", direction));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        self.record(format!("press {}", key));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, PageError> {
        // One fabricated frame per capture; content varies with the
        // action count so consecutive frames differ.
        let state = self.state.lock();
        Ok(format!("frame after {} actions at {}", state.actions.len(), state.url).into_bytes())
    }

    async fn read_visible_text(&self) -> Result<String, PageError> {
        Ok(String::new())
    }

    async fn page_info(&self) -> Result<PageInfo, PageError> {
        let state = self.state.lock();
        Ok(PageInfo {
            url: state.url.clone(),
            title: "Simulated page".into(),
        })
    }
}

/// Factory handing out one fresh simulated driver per session.
#[derive(Default)]
pub struct SimulatedSessionFactory;

#[async_trait]
impl SessionFactory for SimulatedSessionFactory {
    async fn open(&self) -> Result<Arc<dyn PageDriver>, PageError> {
        Ok(Arc::new(SimulatedDriver::new()))
    }

    async fn close(&self, session: &SessionId) -> Result<(), PageError> {
        tracing::debug!(session = %session, "simulated session released");
        Ok(())
    }
}

/// OCR engine that recognizes nothing. Used when the `ocr` feature is
/// off; perception degrades to its defaults exactly as it would on an
/// OCR failure.
#[derive(Default)]
pub struct NoopOcr;

#[async_trait]
impl OcrEngine for NoopOcr {
    async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
        Ok(String::new())
    }

    async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
        Ok(Vec::new())
    }
}
