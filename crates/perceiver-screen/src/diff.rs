//! Frame-to-frame change detection

use crate::errors::PerceiverError;
use image::GenericImageView;

/// Change above this percentage of total channel range counts as a
/// different screen.
pub const CHANGE_THRESHOLD_PERCENT: f64 = 1.0;

/// Mean absolute per-channel difference between two frames, as a
/// percentage of the full channel range.
pub fn change_ratio(before: &[u8], after: &[u8]) -> Result<f64, PerceiverError> {
    let img_before = image::load_from_memory(before)
        .map_err(|e| PerceiverError::ImageDecode(e.to_string()))?;
    let img_after = image::load_from_memory(after)
        .map_err(|e| PerceiverError::ImageDecode(e.to_string()))?;

    if img_before.dimensions() != img_after.dimensions() {
        return Err(PerceiverError::DiffFailed(
            "frame dimensions do not match".to_string(),
        ));
    }

    let rgb_before = img_before.to_rgb8();
    let rgb_after = img_after.to_rgb8();

    let mut total_diff: u64 = 0;
    for (a, b) in rgb_before.as_raw().iter().zip(rgb_after.as_raw().iter()) {
        total_diff += (*a as i32 - *b as i32).unsigned_abs() as u64;
    }

    let channel_count = rgb_before.as_raw().len() as f64;
    Ok(total_diff as f64 / (channel_count * 255.0) * 100.0)
}

/// Whether the screen changed between two frames.
///
/// Any failure to compare (decode error, dimension mismatch after a
/// viewport resize) is reported as changed - the conservative answer
/// for verification purposes.
pub fn screen_changed(before: &[u8], after: &[u8]) -> bool {
    match change_ratio(before, after) {
        Ok(ratio) => ratio > CHANGE_THRESHOLD_PERCENT,
        Err(err) => {
            tracing::debug!("frame diff unavailable, assuming changed: {}", err);
            true
        }
    }
}
