//! Redaction region geometry.
//!
//! Regions come from two sources: OCR boxes whose text matched a
//! sensitive pattern (padded outward), and guessed input-field areas
//! adjacent to sensitive labels. Overlapping regions are merged so
//! blur is applied once per disjoint rectangle.

use perceiver_screen::BoundingBox;
use serde::{Deserialize, Serialize};

const PADDING: u32 = 10;

/// One rectangle scheduled for blurring, in screenshot pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Padded redaction region around a matched OCR box.
    pub fn around(bounds: &BoundingBox) -> Self {
        Self {
            x: bounds.x.saturating_sub(PADDING),
            y: bounds.y.saturating_sub(PADDING),
            width: bounds.width + 2 * PADDING,
            height: bounds.height + 2 * PADDING,
        }
    }

    /// Guessed input-field area for a sensitive label: the field
    /// usually sits below or to the right, so cover twice the label's
    /// extent starting at its bottom edge.
    pub fn input_field_guess(label: &BoundingBox) -> Self {
        Self {
            x: label.x,
            y: label.y + label.height,
            width: label.width * 2,
            height: label.height * 2,
        }
    }

    fn right(&self) -> u32 {
        self.x + self.width
    }

    fn bottom(&self) -> u32 {
        self.y + self.height
    }

    fn overlaps(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Merge overlapping regions until none overlap.
///
/// A single sweep can leave new overlaps behind (a merged rectangle
/// may grow into a neighbour already passed), so the sweep repeats
/// until it reaches a fixpoint.
pub fn merge_overlapping(mut regions: Vec<Region>) -> Vec<Region> {
    loop {
        let before = regions.len();
        regions = sweep_once(regions);
        if regions.len() == before {
            return regions;
        }
    }
}

fn sweep_once(mut regions: Vec<Region>) -> Vec<Region> {
    if regions.is_empty() {
        return regions;
    }
    regions.sort_by_key(|r| (r.x, r.y));

    let mut merged: Vec<Region> = Vec::with_capacity(regions.len());
    let mut current = regions[0];
    for region in regions.into_iter().skip(1) {
        if current.overlaps(&region) {
            current = current.union(&region);
        } else {
            merged.push(current);
            current = region;
        }
    }
    merged.push(current);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn padding_clamps_at_origin() {
        let r = Region::around(&BoundingBox::new(4, 4, 30, 12));
        assert_eq!(r, Region::new(0, 0, 50, 32));
    }

    #[test]
    fn input_guess_sits_below_label() {
        let r = Region::input_field_guess(&BoundingBox::new(100, 50, 60, 14));
        assert_eq!(r, Region::new(100, 64, 120, 28));
    }

    #[test]
    fn disjoint_regions_stay_apart() {
        let regions = vec![Region::new(0, 0, 10, 10), Region::new(100, 100, 10, 10)];
        assert_eq!(merge_overlapping(regions.clone()), regions);
    }

    #[test]
    fn overlapping_regions_merge_into_union() {
        let merged = merge_overlapping(vec![
            Region::new(0, 0, 20, 20),
            Region::new(10, 10, 20, 20),
        ]);
        assert_eq!(merged, vec![Region::new(0, 0, 30, 30)]);
    }

    #[test]
    fn chained_overlaps_collapse_to_one() {
        let merged = merge_overlapping(vec![
            Region::new(0, 0, 12, 12),
            Region::new(20, 0, 12, 12),
            Region::new(10, 0, 12, 12),
        ]);
        assert_eq!(merged, vec![Region::new(0, 0, 32, 12)]);
    }
}
