//! FastNMS is a CPU kernel library for greedy non-maximum suppression over
//! axis-aligned boxes, plus the Tanhshrink and RReLU activations and a GIoU
//! loss.
//!
//! The kernels take plain slices with shape descriptors; [`ops`] adapts them
//! to dtype-tagged host tensors. Box geometry is always evaluated in `f64`, so
//! results are bit-identical across element types, thread counts and the
//! optional `rayon` and `simd` features.

pub mod activations;
pub mod boxes;
pub mod cancel;
pub mod element;
pub mod kernel;
pub mod losses;
pub mod lowlevel;
pub mod nms;
pub mod ops;
pub mod tensor;
mod trace;
pub mod util;

pub use activations::{rrelu, rrelu_grad, tanhshrink, tanhshrink_grad, RreluParams};
pub use boxes::{giou, iou, BBox};
pub use cancel::CancellationFlag;
pub use element::{DType, Element};
pub use losses::{giou_loss, giou_loss_mean};
pub use nms::{
    fast_non_max_suppression, fast_non_max_suppression_with, NmsParams, OrderStrategy, Selection,
    SelectionStats,
};
pub use ops::{FastNonMaxSuppressionOp, HostData, HostTensor, OpKind};
pub use tensor::{BoxesView, Shape, TensorView};
pub use util::{ErrorKind, FastNmsError, FastNmsResult};

pub use half::{bf16, f16};
