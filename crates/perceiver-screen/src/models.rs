//! Data models for screen perception

use serde::{Deserialize, Serialize};

/// Axis-aligned box in screenshot pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel at the centre of the box, used for coordinate clicks.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One OCR-recognized text run with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    /// Recognition confidence in [0, 1].
    pub confidence: f64,
    pub bounds: BoundingBox,
}

/// Kind of interactive element inferred from OCR text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    EmailField,
    PasswordField,
}

impl ElementKind {
    /// Fixed confidence reported for elements of this kind.
    pub fn confidence(&self) -> f64 {
        match self {
            ElementKind::Button => 0.8,
            ElementKind::EmailField => 0.7,
            ElementKind::PasswordField => 0.9,
        }
    }
}

/// One candidate interactive element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedElement {
    pub kind: ElementKind,
    pub text: String,
    pub confidence: f64,
}

/// Structured facts extracted from one screenshot.
///
/// Recomputed fresh per frame; never mutated, always replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenAnalysis {
    pub extracted_text: String,
    pub page_loaded: bool,
    pub screen_changed: bool,
    pub elements: Vec<DetectedElement>,
}

/// Result of locating a text run on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextHit {
    pub bounds: BoundingBox,
    pub confidence: f64,
}
