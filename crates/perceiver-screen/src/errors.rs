//! Error types for the perception pipeline

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PerceiverError {
    /// Screenshot bytes could not be decoded as an image
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    /// OCR engine failed to extract text
    #[error("ocr failed: {0}")]
    OcrFailed(String),

    /// Frame comparison failed
    #[error("diff failed: {0}")]
    DiffFailed(String),
}
