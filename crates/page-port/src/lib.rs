//! Page capability surface.
//!
//! `PageDriver` is the only boundary through which the automation core
//! touches a browser. A production adapter wires it to a real rendering
//! driver; tests script it. Every operation may fail with a recoverable
//! `PageError` - callers convert failures into step records instead of
//! letting them escape.

pub mod errors;

pub use errors::PageError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use webpilot_core_types::Target;

/// Direction for a viewport scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Parse a loosely-specified direction string; anything that is not
    /// "up" scrolls down, matching the permissive source behavior.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("up") {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        }
    }
}

/// Current page identity, as reported by the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

/// Async capability surface of one live page.
///
/// One driver instance owns exactly one browser page; the session that
/// created it tears it down on every exit path.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL. Adapters are expected to prepend `https://`
    /// when the scheme is missing.
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Click a target: either a structural selector or a raw viewport
    /// coordinate (the OCR fallback path).
    async fn click(&self, target: &Target) -> Result<(), PageError>;

    /// Type text into the element addressed by `selector`.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), PageError>;

    /// Scroll the viewport by roughly one screen.
    async fn scroll(&self, direction: ScrollDirection) -> Result<(), PageError>;

    /// Press a single keyboard key (e.g. "Enter").
    async fn press_key(&self, key: &str) -> Result<(), PageError>;

    /// Capture the visible viewport as encoded image bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, PageError>;

    /// All visible text of the current document.
    async fn read_visible_text(&self) -> Result<String, PageError>;

    /// URL and title of the current page.
    async fn page_info(&self) -> Result<PageInfo, PageError>;
}
