//! OCR engine boundary.
//!
//! The pipeline talks to OCR through a trait so tests can script
//! recognition results and the Tesseract dependency stays optional,
//! behind the `ocr` feature.

use crate::errors::PerceiverError;
use crate::models::TextBox;
use async_trait::async_trait;

/// Text recognition over encoded screenshot bytes.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Plain text of the whole image.
    async fn extract_text(&self, image: &[u8]) -> Result<String, PerceiverError>;

    /// Recognized text runs with bounding boxes.
    async fn extract_boxes(&self, image: &[u8]) -> Result<Vec<TextBox>, PerceiverError>;
}

/// Tesseract-backed OCR engine.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    language: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    pub fn new() -> Self {
        Self::with_language("eng")
    }

    pub fn with_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    fn recognize(&self, image: &[u8]) -> Result<String, PerceiverError> {
        let img = image::load_from_memory(image)
            .map_err(|e| PerceiverError::ImageDecode(e.to_string()))?;
        // Grayscale gives Tesseract a cleaner signal than raw RGBA.
        let gray = image::DynamicImage::ImageLuma8(img.to_luma8());
        let mut png = Vec::new();
        gray.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .map_err(|e| PerceiverError::ImageDecode(e.to_string()))?;

        let tess = tesseract::Tesseract::new(None, Some(&self.language))
            .map_err(|e| PerceiverError::OcrFailed(format!("init failed: {}", e)))?;
        let mut tess = tess
            .set_image_from_mem(&png)
            .map_err(|e| PerceiverError::OcrFailed(format!("set image failed: {}", e)))?;
        tess.get_text()
            .map_err(|e| PerceiverError::OcrFailed(format!("recognition failed: {}", e)))
    }
}

#[cfg(feature = "ocr")]
impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_text(&self, image: &[u8]) -> Result<String, PerceiverError> {
        Ok(self.recognize(image)?.trim().to_string())
    }

    async fn extract_boxes(&self, image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
        use crate::models::BoundingBox;
        use image::GenericImageView;

        // Line-level geometry needs TSV output which the binding does not
        // expose cleanly; report the recognized lines stacked over the
        // full image width so downstream region logic stays conservative.
        let img = image::load_from_memory(image)
            .map_err(|e| PerceiverError::ImageDecode(e.to_string()))?;
        let (width, height) = img.dimensions();
        let text = self.recognize(image)?;

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let line_height = (height / lines.len() as u32).max(1);

        Ok(lines
            .iter()
            .enumerate()
            .map(|(i, line)| TextBox {
                text: line.trim().to_string(),
                confidence: 0.5,
                bounds: BoundingBox::new(0, i as u32 * line_height, width, line_height),
            })
            .collect())
    }
}
