//! Rayon-parallel overlap reduction (feature-gated).
//!
//! "Does any selected box overlap the candidate" is an associative OR, so
//! splitting the selected set across threads cannot change the answer.

use crate::boxes::BBox;
use crate::kernel::{OverlapKernel, SelectedBoxes};
use rayon::prelude::*;

/// Selection size below which the sequential kernel is used instead.
pub const PAR_MIN_SELECTED: usize = 2048;

/// Parallel OR-reduction over the selected set.
pub struct ParallelOverlap;

impl OverlapKernel for ParallelOverlap {
    fn any_overlap(candidate: &BBox, selected: &SelectedBoxes, iou_threshold: f64) -> bool {
        let area = candidate.area();
        (0..selected.len())
            .into_par_iter()
            .any(|i| selected.iou_at(candidate, area, i) > iou_threshold)
    }
}
