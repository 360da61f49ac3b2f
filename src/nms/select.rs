//! Greedy selection loop.

use crate::cancel::CancellationFlag;
use crate::element::Element;
use crate::kernel::{any_overlap, SelectedBoxes};
use crate::nms::config::ResolvedParams;
use crate::nms::order::CandidateOrder;
use crate::tensor::BoxesView;
use crate::util::alloc::try_with_capacity;
use crate::util::math::index_to_i32;
use crate::util::{FastNmsError, FastNmsResult};

/// Counters describing one suppression run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Candidates that passed the score filter.
    pub admitted: usize,
    /// Candidates popped from the ordering before termination.
    pub visited: usize,
    /// Candidates dropped for overlapping an earlier selection.
    pub suppressed: usize,
    /// Candidates dropped for zero area or non-finite coordinates.
    pub degenerate: usize,
}

/// Output of a suppression run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected box indices in selection order.
    pub indices: Vec<i32>,
    /// Run counters.
    pub stats: SelectionStats,
}

pub(crate) fn greedy_select<T: Element>(
    boxes: BoxesView<'_, T>,
    order: CandidateOrder,
    params: &ResolvedParams,
    cancel: Option<&CancellationFlag>,
) -> FastNmsResult<Selection> {
    let admitted = order.remaining();
    let capacity = params.max_output.min(admitted);
    let mut selected = SelectedBoxes::with_capacity(capacity)?;
    let mut indices = try_with_capacity(capacity, "selected indices")?;
    let mut stats = SelectionStats {
        admitted,
        ..SelectionStats::default()
    };

    // IoU never exceeds 1, so a unit threshold cannot suppress anything.
    let test_overlap = params.iou_threshold < 1.0;

    for candidate in order {
        if indices.len() >= params.max_output {
            break;
        }
        if cancel.is_some_and(CancellationFlag::is_cancelled) {
            return Err(FastNmsError::Cancelled);
        }
        stats.visited += 1;

        let bbox = boxes
            .bbox(candidate.index)
            .ok_or(FastNmsError::Internal("candidate index outside boxes"))?;
        if !bbox.is_selectable() {
            stats.degenerate += 1;
            continue;
        }
        if test_overlap && any_overlap(&bbox, &selected, params.iou_threshold, params.parallel) {
            stats.suppressed += 1;
            continue;
        }

        selected.push(&bbox);
        indices.push(index_to_i32(candidate.index)?);
    }

    Ok(Selection { indices, stats })
}
