//! Building blocks for custom suppression pipelines.
//!
//! Most users should call [`crate::fast_non_max_suppression`]; these items
//! expose the candidate ordering and overlap kernels it is assembled from.

pub use crate::kernel::scalar::ScalarOverlap;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdOverlap;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::ParallelOverlap;
pub use crate::kernel::{OverlapKernel, SelectedBoxes};
pub use crate::nms::order::{order_candidates, Candidate};
