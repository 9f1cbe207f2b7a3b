//! Resolution types

use serde::{Deserialize, Serialize};
use webpilot_core_types::Target;

/// One way of turning a requested target into a page handle, in
/// priority order. Cheap and specific strategies come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStrategy {
    /// The literal target, tried as-is
    ExactSelector,
    /// The target interpreted as visible text content
    TextContent,
    /// The target translated into a structural (XPath) query
    Structural,
    /// Variants derived from the target's id/class/attribute fragments
    FragmentAlternatives,
    /// Fixed fallback tables for well-known semantic roles
    KeywordFallback,
    /// Text located via OCR, yielding a coordinate click target
    OcrText,
}

impl ResolveStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ResolveStrategy::ExactSelector => "exact_selector",
            ResolveStrategy::TextContent => "text_content",
            ResolveStrategy::Structural => "structural",
            ResolveStrategy::FragmentAlternatives => "fragment_alternatives",
            ResolveStrategy::KeywordFallback => "keyword_fallback",
            ResolveStrategy::OcrText => "ocr_text",
        }
    }
}

/// One candidate produced by resolution, consumed greedily by the
/// executor: first candidate that works wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionAttempt {
    pub strategy: ResolveStrategy,
    pub candidate: Target,
}

impl ResolutionAttempt {
    pub fn selector(strategy: ResolveStrategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            candidate: Target::Selector(selector.into()),
        }
    }

    pub fn coords(strategy: ResolveStrategy, x: u32, y: u32) -> Self {
        Self {
            strategy,
            candidate: Target::Coords { x, y },
        }
    }
}
