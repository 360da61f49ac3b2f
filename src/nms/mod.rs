//! Fast greedy non-maximum suppression over axis-aligned boxes.
//!
//! Candidates are visited by descending score (ties by ascending index). A
//! candidate is kept unless its IoU with an already kept box exceeds the
//! threshold; the run stops once `max_output_size` boxes are kept or the
//! candidates are exhausted. Boxes with zero area or non-finite coordinates
//! are never kept, and scores that are non-finite or below the score
//! threshold never enter the ordering.

pub mod config;
pub mod order;
pub mod select;

pub use config::{NmsParams, OrderStrategy};
pub use order::{order_candidates, Candidate};
pub use select::{Selection, SelectionStats};

use crate::cancel::CancellationFlag;
use crate::element::Element;
use crate::tensor::BoxesView;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::math::MAX_INDEXABLE;
use crate::util::{FastNmsError, FastNmsResult};
use order::{admit_candidates, CandidateOrder};
use select::greedy_select;

/// Registered op name of the suppression kernel.
pub const OP_NAME: &str = "FastNonMaxSuppression";

/// Selects box indices by greedy non-maximum suppression.
///
/// Returns the selected indices in selection order; the result has at most
/// `params.max_output_size` entries and is not padded.
pub fn fast_non_max_suppression<T: Element>(
    boxes: BoxesView<'_, T>,
    scores: &[T],
    params: &NmsParams,
) -> FastNmsResult<Vec<i32>> {
    fast_non_max_suppression_with(boxes, scores, params, None).map(|s| s.indices)
}

/// Like [`fast_non_max_suppression`], polling `cancel` once per candidate and
/// returning run counters alongside the indices.
pub fn fast_non_max_suppression_with<T: Element>(
    boxes: BoxesView<'_, T>,
    scores: &[T],
    params: &NmsParams,
    cancel: Option<&CancellationFlag>,
) -> FastNmsResult<Selection> {
    let resolved = params.resolve()?;
    if scores.len() != boxes.len() {
        return Err(FastNmsError::ShapeMismatch {
            name: "scores",
            expected: "[N] with N equal to the number of boxes",
            got: vec![scores.len()],
        });
    }
    if boxes.len() > MAX_INDEXABLE {
        return Err(FastNmsError::InvalidArgument(
            "box count exceeds the int32 index range",
        ));
    }

    let _span = trace_span!(
        "fast_nms",
        n = boxes.len(),
        max_output_size = resolved.max_output
    )
    .entered();

    if boxes.is_empty() || resolved.max_output == 0 {
        trace_debug!(
            "nms_short_circuit",
            n = boxes.len(),
            max_output_size = resolved.max_output
        );
        return Ok(Selection::default());
    }

    let candidates = admit_candidates(scores, resolved.score_threshold)?;
    trace_event!("nms_candidates", admitted = candidates.len());

    let order = if resolved.use_heap(candidates.len()) {
        CandidateOrder::heap(candidates)
    } else {
        CandidateOrder::sorted(candidates, resolved.parallel)
    };
    let selection = greedy_select(boxes, order, &resolved, cancel)?;

    trace_event!(
        "nms_selected",
        count = selection.indices.len(),
        suppressed = selection.stats.suppressed,
        degenerate = selection.stats.degenerate
    );
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::{fast_non_max_suppression, NmsParams};
    use crate::tensor::BoxesView;
    use crate::util::FastNmsError;

    #[test]
    fn score_length_must_match_boxes() {
        let boxes = [0.0f32, 0.0, 1.0, 1.0];
        let view = BoxesView::from_slice(&boxes, 1).unwrap();
        let err = fast_non_max_suppression(view, &[0.1, 0.2], &NmsParams::default()).unwrap_err();
        assert!(matches!(err, FastNmsError::ShapeMismatch { name: "scores", .. }));
    }

    #[test]
    fn zero_cap_selects_nothing() {
        let boxes = [0.0f32, 0.0, 1.0, 1.0];
        let view = BoxesView::from_slice(&boxes, 1).unwrap();
        let out = fast_non_max_suppression(view, &[0.9], &NmsParams::new(0, 0.5, 0.0)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn parameters_are_validated_before_shapes() {
        let view = BoxesView::<f32>::from_slice(&[], 0).unwrap();
        let err = fast_non_max_suppression(view, &[], &NmsParams::new(-3, 0.5, 0.0)).unwrap_err();
        assert!(matches!(err, FastNmsError::InvalidArgument(_)));
    }
}
