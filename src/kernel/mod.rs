//! Overlap kernels for the selection loop.
//!
//! The selection loop keeps accepted boxes in a [`SelectedBoxes`] column store
//! and asks an [`OverlapKernel`] whether a candidate overlaps any of them by
//! more than the IoU threshold. Every implementation computes the same `f64`
//! IoU per pair, so the decision is identical whichever one runs.

use crate::boxes::BBox;
use crate::util::alloc::try_with_capacity;
use crate::util::FastNmsResult;

/// Column-major store of selected boxes with cached areas.
#[derive(Clone, Debug, Default)]
pub struct SelectedBoxes {
    y1: Vec<f64>,
    x1: Vec<f64>,
    y2: Vec<f64>,
    x2: Vec<f64>,
    area: Vec<f64>,
}

impl SelectedBoxes {
    /// Reserves room for `capacity` boxes up front.
    pub fn with_capacity(capacity: usize) -> FastNmsResult<Self> {
        Ok(Self {
            y1: try_with_capacity(capacity, "selected boxes")?,
            x1: try_with_capacity(capacity, "selected boxes")?,
            y2: try_with_capacity(capacity, "selected boxes")?,
            x2: try_with_capacity(capacity, "selected boxes")?,
            area: try_with_capacity(capacity, "selected boxes")?,
        })
    }

    /// Appends a box.
    pub fn push(&mut self, b: &BBox) {
        self.y1.push(b.y1);
        self.x1.push(b.x1);
        self.y2.push(b.y2);
        self.x2.push(b.x2);
        self.area.push(b.area());
    }

    /// Number of stored boxes.
    pub fn len(&self) -> usize {
        self.area.len()
    }

    /// True when nothing has been selected yet.
    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    /// Returns stored box `i`.
    pub fn get(&self, i: usize) -> Option<BBox> {
        Some(BBox::new(
            *self.y1.get(i)?,
            *self.x1.get(i)?,
            *self.y2.get(i)?,
            *self.x2.get(i)?,
        ))
    }

    /// IoU between `candidate` (with precomputed area) and stored box `i`.
    #[inline]
    pub(crate) fn iou_at(&self, candidate: &BBox, candidate_area: f64, i: usize) -> f64 {
        let ih = (candidate.y2.min(self.y2[i]) - candidate.y1.max(self.y1[i])).max(0.0);
        let iw = (candidate.x2.min(self.x2[i]) - candidate.x1.max(self.x1[i])).max(0.0);
        crate::boxes::iou_from_parts(ih * iw, candidate_area, self.area[i])
    }
}

/// Decides whether a candidate is suppressed by the current selection.
pub trait OverlapKernel {
    /// Returns true when `candidate` has IoU strictly above `iou_threshold`
    /// with any box in `selected`.
    fn any_overlap(candidate: &BBox, selected: &SelectedBoxes, iou_threshold: f64) -> bool;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(not(feature = "simd"))]
use scalar::ScalarOverlap as SequentialOverlap;
#[cfg(feature = "simd")]
use simd::SimdOverlap as SequentialOverlap;

/// Picks the best available kernel for the current selection size.
#[inline]
pub(crate) fn any_overlap(
    candidate: &BBox,
    selected: &SelectedBoxes,
    iou_threshold: f64,
    parallel: bool,
) -> bool {
    #[cfg(feature = "rayon")]
    if parallel && selected.len() >= self::rayon::PAR_MIN_SELECTED {
        return <self::rayon::ParallelOverlap as OverlapKernel>::any_overlap(
            candidate,
            selected,
            iou_threshold,
        );
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    <SequentialOverlap as OverlapKernel>::any_overlap(candidate, selected, iou_threshold)
}

#[cfg(test)]
mod tests {
    use super::SelectedBoxes;
    use crate::boxes::{iou, BBox};

    #[test]
    fn column_store_matches_pairwise_iou() {
        let boxes = [
            BBox::new(0.0, 0.0, 10.0, 10.0),
            BBox::new(5.0, 5.0, 15.0, 15.0),
            BBox::new(-3.0, 2.0, 4.0, 9.0),
        ];
        let mut selected = SelectedBoxes::with_capacity(boxes.len()).unwrap();
        for b in &boxes {
            selected.push(b);
        }
        assert_eq!(selected.len(), 3);
        let query = BBox::new(1.0, 1.0, 11.0, 11.0);
        for (i, b) in boxes.iter().enumerate() {
            assert_eq!(selected.iou_at(&query, query.area(), i), iou(&query, b));
            assert_eq!(selected.get(i), Some(*b));
        }
        assert!(selected.get(3).is_none());
    }
}
