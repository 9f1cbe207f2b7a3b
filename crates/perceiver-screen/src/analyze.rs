//! Screenshot analysis.
//!
//! Produces a [`ScreenAnalysis`] per frame. OCR failures degrade to an
//! empty analysis rather than erroring, so perception never blocks the
//! control loop.

use std::sync::Arc;

use crate::diff;
use crate::models::{DetectedElement, ElementKind, ScreenAnalysis, TextHit};
use crate::ocr::OcrEngine;

const PAGE_LOADED_MIN_TEXT: usize = 50;

const BUTTON_KEYWORDS: &[&str] = &["button", "click", "submit", "search", "login", "sign"];

/// OCR-driven screen perceiver.
pub struct ScreenPerceiver {
    ocr: Arc<dyn OcrEngine>,
}

impl ScreenPerceiver {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Analyze one frame, optionally against the previous one.
    ///
    /// `screen_changed` is true when no previous frame is supplied - a
    /// first observation always counts as new information.
    pub async fn analyze(&self, frame: &[u8], previous: Option<&[u8]>) -> ScreenAnalysis {
        let extracted_text = match self.ocr.extract_text(frame).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("text extraction failed, degrading to empty: {}", err);
                String::new()
            }
        };

        let page_loaded = extracted_text.trim().len() > PAGE_LOADED_MIN_TEXT;
        let screen_changed = match previous {
            Some(prev) => diff::screen_changed(prev, frame),
            None => true,
        };
        let elements = classify_elements(&extracted_text);

        ScreenAnalysis {
            extracted_text,
            page_loaded,
            screen_changed,
            elements,
        }
    }

    /// First OCR box whose text contains `needle`, case-insensitively.
    pub async fn find_by_text(&self, frame: &[u8], needle: &str) -> Option<TextHit> {
        let boxes = match self.ocr.extract_boxes(frame).await {
            Ok(boxes) => boxes,
            Err(err) => {
                tracing::warn!("box extraction failed: {}", err);
                return None;
            }
        };
        let needle = needle.to_lowercase();
        boxes
            .into_iter()
            .find(|b| b.text.to_lowercase().contains(&needle))
            .map(|b| TextHit {
                bounds: b.bounds,
                confidence: b.confidence,
            })
    }
}

/// Infer interactive elements from recognized text, line by line.
fn classify_elements(text: &str) -> Vec<DetectedElement> {
    let mut elements = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.len() <= 2 {
            continue;
        }
        let lower = line.to_lowercase();
        let kind = if lower.contains("password") {
            Some(ElementKind::PasswordField)
        } else if lower.contains('@') || lower.contains("email") {
            Some(ElementKind::EmailField)
        } else if BUTTON_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Some(ElementKind::Button)
        } else {
            None
        };
        if let Some(kind) = kind {
            elements.push(DetectedElement {
                kind,
                text: line.to_string(),
                confidence: kind.confidence(),
            });
        }
    }
    elements
}
