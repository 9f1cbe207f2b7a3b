//! Screenshot redaction.
//!
//! Detection runs OCR over the frame, collects regions for matched
//! patterns and sensitive labels, merges them, and blurs each merged
//! rectangle. The failure mode is configurable: lenient passes the
//! original frame through with a warning, strict refuses to emit an
//! unredacted frame.

use std::sync::Arc;

use image::RgbaImage;
use perceiver_screen::OcrEngine;
use serde::{Deserialize, Serialize};

use crate::errors::ShieldError;
use crate::patterns;
use crate::regions::{self, Region};

const BLUR_SIGMA: f32 = 20.0;

/// What to do when redaction itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMode {
    /// Pass the original frame through and warn. Never blocks the
    /// task, at the cost of possibly leaking an unredacted frame.
    #[default]
    Lenient,
    /// Refuse to emit the frame, failing the caller instead.
    Strict,
}

pub struct Redactor {
    ocr: Arc<dyn OcrEngine>,
    mode: RedactionMode,
}

impl Redactor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            ocr,
            mode: RedactionMode::default(),
        }
    }

    pub fn with_mode(ocr: Arc<dyn OcrEngine>, mode: RedactionMode) -> Self {
        Self { ocr, mode }
    }

    pub fn mode(&self) -> RedactionMode {
        self.mode
    }

    /// Redact a screenshot, honoring the configured failure mode.
    pub async fn redact(&self, frame: &[u8]) -> Result<Vec<u8>, ShieldError> {
        match self.try_redact(frame).await {
            Ok(redacted) => Ok(redacted),
            Err(err) => match self.mode {
                RedactionMode::Lenient => {
                    tracing::warn!("redaction failed, passing frame through: {}", err);
                    Ok(frame.to_vec())
                }
                RedactionMode::Strict => Err(err),
            },
        }
    }

    async fn try_redact(&self, frame: &[u8]) -> Result<Vec<u8>, ShieldError> {
        let regions = self.detect_regions(frame).await?;
        if regions.is_empty() {
            return Ok(frame.to_vec());
        }
        tracing::debug!(count = regions.len(), "blurring sensitive regions");
        blur_regions(frame, &regions)
    }

    /// OCR the frame and collect merged sensitive regions.
    pub async fn detect_regions(&self, frame: &[u8]) -> Result<Vec<Region>, ShieldError> {
        let boxes = self
            .ocr
            .extract_boxes(frame)
            .await
            .map_err(|e| ShieldError::Detection(e.to_string()))?;

        let mut found = Vec::new();
        for text_box in &boxes {
            let text = text_box.text.trim();
            if text.is_empty() {
                continue;
            }
            if patterns::is_sensitive_text(text) {
                found.push(Region::around(&text_box.bounds));
            }
            if patterns::is_sensitive_label(text) {
                found.push(Region::input_field_guess(&text_box.bounds));
            }
        }
        Ok(regions::merge_overlapping(found))
    }
}

/// Blur each region in place and re-encode as PNG.
fn blur_regions(frame: &[u8], regions: &[Region]) -> Result<Vec<u8>, ShieldError> {
    let mut img: RgbaImage = image::load_from_memory(frame)
        .map_err(|e| ShieldError::Image(e.to_string()))?
        .to_rgba8();
    let (img_w, img_h) = img.dimensions();

    for region in regions {
        if region.x >= img_w || region.y >= img_h {
            continue;
        }
        let w = region.width.min(img_w - region.x);
        let h = region.height.min(img_h - region.y);
        if w == 0 || h == 0 {
            continue;
        }
        let sub = image::imageops::crop_imm(&img, region.x, region.y, w, h).to_image();
        let blurred = image::imageops::blur(&sub, BLUR_SIGMA);
        image::imageops::replace(&mut img, &blurred, region.x as i64, region.y as i64);
    }

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| ShieldError::Image(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageBuffer, Rgba};
    use perceiver_screen::{BoundingBox, PerceiverError, TextBox};

    struct FakeOcr {
        boxes: Vec<TextBox>,
    }

    #[async_trait]
    impl OcrEngine for FakeOcr {
        async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
            Ok(String::new())
        }

        async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
            Ok(self.boxes.clone())
        }
    }

    struct BrokenOcr;

    #[async_trait]
    impl OcrEngine for BrokenOcr {
        async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
            Err(PerceiverError::OcrFailed("down".into()))
        }

        async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
            Err(PerceiverError::OcrFailed("down".into()))
        }
    }

    fn text_box(text: &str, x: u32, y: u32) -> TextBox {
        TextBox {
            text: text.to_string(),
            confidence: 0.9,
            bounds: BoundingBox::new(x, y, 60, 14),
        }
    }

    fn white_png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgba([255u8, 255, 255, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn sensitive_text_and_labels_produce_regions() {
        let redactor = Redactor::new(Arc::new(FakeOcr {
            boxes: vec![
                text_box("Password", 100, 50),
                text_box("Welcome back", 10, 10),
            ],
        }));
        let frame = white_png(400, 300);
        let regions = redactor.detect_regions(&frame).await.unwrap();
        // Matched keyword box plus the guessed input field below it.
        assert!(!regions.is_empty());
        assert!(regions.iter().all(|r| r.y >= 40));
    }

    #[tokio::test]
    async fn clean_frame_passes_through_unchanged() {
        let redactor = Redactor::new(Arc::new(FakeOcr {
            boxes: vec![text_box("Welcome back", 10, 10)],
        }));
        let frame = white_png(200, 100);
        let out = redactor.redact(&frame).await.unwrap();
        assert_eq!(out, frame);
    }

    #[tokio::test]
    async fn lenient_mode_passes_original_on_failure() {
        let redactor = Redactor::new(Arc::new(BrokenOcr));
        let frame = white_png(100, 100);
        let out = redactor.redact(&frame).await.unwrap();
        assert_eq!(out, frame);
    }

    #[tokio::test]
    async fn strict_mode_fails_on_detection_error() {
        let redactor = Redactor::with_mode(Arc::new(BrokenOcr), RedactionMode::Strict);
        let frame = white_png(100, 100);
        assert!(redactor.redact(&frame).await.is_err());
    }

    #[tokio::test]
    async fn regions_out_of_bounds_are_skipped() {
        let redactor = Redactor::new(Arc::new(FakeOcr {
            boxes: vec![text_box("password", 500, 500)],
        }));
        // Region lies entirely past the 100x100 frame.
        let frame = white_png(100, 100);
        assert!(redactor.redact(&frame).await.is_ok());
    }
}
