//! Parameters for fast non-maximum suppression.

use crate::util::math::clamp_unit;
use crate::util::{FastNmsError, FastNmsResult};

/// How the candidate ordering is materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OrderStrategy {
    /// Heap when `max_output_size` is small relative to the candidate count,
    /// full sort otherwise.
    #[default]
    Auto,
    /// Sort all admitted candidates up front.
    Sort,
    /// Heapify admitted candidates and pop them lazily.
    Heap,
}

/// Heap is preferred once candidates outnumber the output cap by this factor.
pub(crate) const HEAP_RATIO: usize = 8;

/// Configuration for a suppression call.
#[derive(Clone, Debug, PartialEq)]
pub struct NmsParams {
    /// Upper bound on the number of selected boxes; must be non-negative.
    pub max_output_size: i32,
    /// Overlap above which a lower-scoring box is suppressed. Clamped to
    /// `[0, 1]`; NaN is rejected.
    pub iou_threshold: f64,
    /// Boxes scoring strictly below this are never considered. NaN is
    /// rejected.
    pub score_threshold: f64,
    /// Candidate ordering strategy. Does not affect the result.
    pub order: OrderStrategy,
    /// Allow intra-op parallelism (requires the `rayon` feature). Does not
    /// affect the result.
    pub parallel: bool,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self {
            max_output_size: i32::MAX,
            iou_threshold: 0.5,
            score_threshold: f64::NEG_INFINITY,
            order: OrderStrategy::Auto,
            parallel: false,
        }
    }
}

impl NmsParams {
    /// Creates parameters with the given cap and thresholds.
    pub fn new(max_output_size: i32, iou_threshold: f64, score_threshold: f64) -> Self {
        Self {
            max_output_size,
            iou_threshold,
            score_threshold,
            ..Self::default()
        }
    }

    /// Checks parameter domains without resolving them.
    pub fn validate(&self) -> FastNmsResult<()> {
        self.resolve().map(|_| ())
    }

    pub(crate) fn resolve(&self) -> FastNmsResult<ResolvedParams> {
        let max_output = usize::try_from(self.max_output_size)
            .map_err(|_| FastNmsError::InvalidArgument("max_output_size must be non-negative"))?;
        let iou_threshold = clamp_unit(self.iou_threshold)?;
        if self.score_threshold.is_nan() {
            return Err(FastNmsError::InvalidArgument("score_threshold must not be NaN"));
        }
        Ok(ResolvedParams {
            max_output,
            iou_threshold,
            score_threshold: self.score_threshold,
            order: self.order,
            parallel: self.parallel,
        })
    }
}

/// Validated parameters in kernel units.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedParams {
    pub max_output: usize,
    pub iou_threshold: f64,
    pub score_threshold: f64,
    pub order: OrderStrategy,
    pub parallel: bool,
}

impl ResolvedParams {
    /// Picks the concrete ordering for `admitted` candidates.
    pub fn use_heap(&self, admitted: usize) -> bool {
        match self.order {
            OrderStrategy::Sort => false,
            OrderStrategy::Heap => true,
            OrderStrategy::Auto => self.max_output.saturating_mul(HEAP_RATIO) < admitted,
        }
    }
}
