//! Screen perception pipeline.
//!
//! Turns a raw screenshot into structured, verifiable facts: extracted
//! text, a page-loaded signal, candidate interactive elements, and a
//! change score against a prior frame. Perception never fails a caller;
//! every stage degrades to an empty or default result.

pub mod analyze;
pub mod diff;
pub mod errors;
pub mod models;
pub mod ocr;

pub use analyze::ScreenPerceiver;
pub use errors::PerceiverError;
pub use models::{
    BoundingBox, DetectedElement, ElementKind, ScreenAnalysis, TextBox, TextHit,
};
pub use ocr::OcrEngine;

#[cfg(feature = "ocr")]
pub use ocr::TesseractOcr;
