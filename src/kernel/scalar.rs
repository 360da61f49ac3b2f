//! Scalar reference overlap kernel.

use crate::boxes::BBox;
use crate::kernel::{OverlapKernel, SelectedBoxes};

/// Linear scan with early exit on the first overlap.
pub struct ScalarOverlap;

impl OverlapKernel for ScalarOverlap {
    fn any_overlap(candidate: &BBox, selected: &SelectedBoxes, iou_threshold: f64) -> bool {
        let area = candidate.area();
        (0..selected.len()).any(|i| selected.iou_at(candidate, area, i) > iou_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarOverlap;
    use crate::boxes::BBox;
    use crate::kernel::{OverlapKernel, SelectedBoxes};

    #[test]
    fn threshold_is_strict() {
        let mut selected = SelectedBoxes::with_capacity(1).unwrap();
        let a = BBox::new(0.0, 0.0, 2.0, 2.0);
        selected.push(&a);
        // half of `a`: IoU exactly 0.5
        let half = BBox::new(0.0, 0.0, 1.0, 2.0);
        assert!(!ScalarOverlap::any_overlap(&half, &selected, 0.5));
        assert!(ScalarOverlap::any_overlap(&half, &selected, 0.49));
    }

    #[test]
    fn empty_selection_never_overlaps() {
        let selected = SelectedBoxes::default();
        let a = BBox::new(0.0, 0.0, 2.0, 2.0);
        assert!(!ScalarOverlap::any_overlap(&a, &selected, 0.0));
    }
}
