//! Host framework adapter.
//!
//! A host hands kernels dtype-tagged dense tensors. This module validates
//! ranks, shapes and element types, dispatches to the generic kernels and
//! wraps the results back into host tensors. It owns no state; every call is
//! independent.
//!
//! RReLU and its gradient take a caller-owned random source and are exposed
//! only as library functions in [`crate::activations`]; they are not
//! registered here.

use crate::activations::{tanhshrink, tanhshrink_grad, TANHSHRINK_GRAD_OP, TANHSHRINK_OP};
use crate::cancel::CancellationFlag;
use crate::element::{DType, Element};
use crate::nms::{fast_non_max_suppression_with, NmsParams, OP_NAME as NMS_OP};
use crate::tensor::{BoxesView, Shape, TensorView};
use crate::util::{FastNmsError, FastNmsResult};
use half::{bf16, f16};

/// Typed storage of a host tensor.
#[derive(Clone, Debug, PartialEq)]
pub enum HostData {
    F16(Vec<f16>),
    BF16(Vec<bf16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    Bool(Vec<bool>),
}

impl HostData {
    /// Element type tag.
    pub fn dtype(&self) -> DType {
        match self {
            HostData::F16(_) => DType::F16,
            HostData::BF16(_) => DType::BF16,
            HostData::F32(_) => DType::F32,
            HostData::F64(_) => DType::F64,
            HostData::I32(_) => DType::I32,
            HostData::I64(_) => DType::I64,
            HostData::U8(_) => DType::U8,
            HostData::Bool(_) => DType::Bool,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            HostData::F16(v) => v.len(),
            HostData::BF16(v) => v.len(),
            HostData::F32(v) => v.len(),
            HostData::F64(v) => v.len(),
            HostData::I32(v) => v.len(),
            HostData::I64(v) => v.len(),
            HostData::U8(v) => v.len(),
            HostData::Bool(v) => v.len(),
        }
    }

    /// True when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense host tensor: typed data plus shape.
#[derive(Clone, Debug, PartialEq)]
pub struct HostTensor {
    data: HostData,
    shape: Shape,
}

impl HostTensor {
    /// Creates a tensor, checking the element count against the shape.
    pub fn new(data: HostData, shape: Shape) -> FastNmsResult<Self> {
        let needed = shape.num_elements()?;
        if data.len() != needed {
            return Err(FastNmsError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Wraps typed floating data.
    pub fn from_elements<T: HostElement>(values: Vec<T>, shape: Shape) -> FastNmsResult<Self> {
        Self::new(T::wrap(values), shape)
    }

    /// Rank-0 int32 tensor.
    pub fn scalar_i32(value: i32) -> Self {
        Self {
            data: HostData::I32(vec![value]),
            shape: Shape::scalar(),
        }
    }

    /// Rank-0 float32 tensor.
    pub fn scalar_f32(value: f32) -> Self {
        Self {
            data: HostData::F32(vec![value]),
            shape: Shape::scalar(),
        }
    }

    /// Rank-0 float64 tensor.
    pub fn scalar_f64(value: f64) -> Self {
        Self {
            data: HostData::F64(vec![value]),
            shape: Shape::scalar(),
        }
    }

    /// Element type tag.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Tensor shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Typed storage.
    pub fn data(&self) -> &HostData {
        &self.data
    }

    /// Returns the int32 contents, if the tensor is int32.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.data {
            HostData::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the contents as `T`, if the dtype matches.
    pub fn as_elements<T: HostElement>(&self) -> Option<&[T]> {
        T::unwrap(&self.data)
    }

    fn view<T: HostElement>(&self, name: &'static str) -> FastNmsResult<TensorView<'_, T>> {
        let data = T::unwrap(&self.data).ok_or(FastNmsError::DTypeMismatch {
            name,
            expected: T::DTYPE,
            got: self.dtype(),
        })?;
        TensorView::new(data, self.shape.clone())
    }

    /// Reads a rank-0 floating tensor of any supported dtype, widened to `f64`.
    fn scalar_as_f64(&self, name: &'static str) -> FastNmsResult<f64> {
        if self.shape.rank() != 0 {
            return Err(FastNmsError::ShapeMismatch {
                name,
                expected: "scalar",
                got: self.shape.dims().to_vec(),
            });
        }
        let value = match &self.data {
            HostData::F16(v) => v.first().map(|x| x.to_f64()),
            HostData::BF16(v) => v.first().map(|x| x.to_f64()),
            HostData::F32(v) => v.first().map(|&x| f64::from(x)),
            HostData::F64(v) => v.first().copied(),
            _ => {
                return Err(FastNmsError::DTypeMismatch {
                    name,
                    expected: DType::F32,
                    got: self.dtype(),
                })
            }
        };
        value.ok_or(FastNmsError::Internal("scalar tensor without data"))
    }

    /// Reads a rank-0 int32 tensor.
    fn scalar_i32_value(&self, name: &'static str) -> FastNmsResult<i32> {
        let data = self.as_i32().ok_or(FastNmsError::DTypeMismatch {
            name,
            expected: DType::I32,
            got: self.dtype(),
        })?;
        let view = TensorView::new(data, self.shape.clone())?;
        view.scalar(name).copied()
    }
}

/// Element types that can be moved in and out of [`HostData`].
pub trait HostElement: Element {
    /// Wraps a typed vector.
    fn wrap(values: Vec<Self>) -> HostData;
    /// Borrows the typed slice when the dtype matches.
    fn unwrap(data: &HostData) -> Option<&[Self]>;
}

macro_rules! impl_host_element {
    ($ty:ty, $variant:ident) => {
        impl HostElement for $ty {
            fn wrap(values: Vec<Self>) -> HostData {
                HostData::$variant(values)
            }

            fn unwrap(data: &HostData) -> Option<&[Self]> {
                match data {
                    HostData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_host_element!(f16, F16);
impl_host_element!(bf16, BF16);
impl_host_element!(f32, F32);
impl_host_element!(f64, F64);

/// Kernels exposed to the host, looked up by registered name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    FastNonMaxSuppression,
    Tanhshrink,
    TanhshrinkGrad,
}

impl OpKind {
    /// Every registered op.
    pub const ALL: [OpKind; 3] = [
        OpKind::FastNonMaxSuppression,
        OpKind::Tanhshrink,
        OpKind::TanhshrinkGrad,
    ];

    /// Registered name.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::FastNonMaxSuppression => NMS_OP,
            OpKind::Tanhshrink => TANHSHRINK_OP,
            OpKind::TanhshrinkGrad => TANHSHRINK_GRAD_OP,
        }
    }

    /// Resolves a registered name.
    pub fn from_name(name: &str) -> FastNmsResult<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| FastNmsError::UnknownOp(name.to_owned()))
    }

    /// Number of input tensors the op consumes.
    pub fn num_inputs(self) -> usize {
        match self {
            OpKind::FastNonMaxSuppression => 5,
            OpKind::Tanhshrink => 1,
            OpKind::TanhshrinkGrad => 2,
        }
    }

    /// Runs the op. Cancellation is honored by ops that poll for it.
    pub fn compute(
        self,
        inputs: &[&HostTensor],
        cancel: Option<&CancellationFlag>,
    ) -> FastNmsResult<HostTensor> {
        if inputs.len() != self.num_inputs() {
            return Err(FastNmsError::InvalidArgument("wrong number of op inputs"));
        }
        match self {
            OpKind::FastNonMaxSuppression => FastNonMaxSuppressionOp::compute(
                inputs[0], inputs[1], inputs[2], inputs[3], inputs[4], cancel,
            ),
            OpKind::Tanhshrink => tanhshrink_op(inputs[0]),
            OpKind::TanhshrinkGrad => tanhshrink_grad_op(inputs[0], inputs[1]),
        }
    }
}

/// Dispatches a generic body over the supported floating dtypes.
macro_rules! dispatch_float {
    ($dtype:expr, $op:expr, $body:ident $(, $arg:expr)*) => {
        match $dtype {
            DType::F16 => $body::<f16>($($arg),*),
            DType::BF16 => $body::<bf16>($($arg),*),
            DType::F32 => $body::<f32>($($arg),*),
            DType::F64 => $body::<f64>($($arg),*),
            dtype => Err(FastNmsError::UnsupportedDType { op: $op, dtype }),
        }
    };
}

/// Host binding of the suppression kernel.
pub struct FastNonMaxSuppressionOp;

impl FastNonMaxSuppressionOp {
    /// Validates host tensors and returns `selected_indices` as int32 `[K]`.
    ///
    /// `iou_threshold` and `score_threshold` may be rank-0 tensors of any
    /// supported floating type; `max_output_size` must be rank-0 int32.
    pub fn compute(
        boxes: &HostTensor,
        scores: &HostTensor,
        max_output_size: &HostTensor,
        iou_threshold: &HostTensor,
        score_threshold: &HostTensor,
        cancel: Option<&CancellationFlag>,
    ) -> FastNmsResult<HostTensor> {
        match boxes.shape().dims() {
            [_, 4] => {}
            dims => {
                return Err(FastNmsError::ShapeMismatch {
                    name: "boxes",
                    expected: "[N, 4]",
                    got: dims.to_vec(),
                })
            }
        }
        match scores.shape().dims() {
            [n] if *n == boxes.shape().dims()[0] => {}
            dims => {
                return Err(FastNmsError::ShapeMismatch {
                    name: "scores",
                    expected: "[N] with N equal to the number of boxes",
                    got: dims.to_vec(),
                })
            }
        }
        if scores.dtype() != boxes.dtype() {
            return Err(FastNmsError::DTypeMismatch {
                name: "scores",
                expected: boxes.dtype(),
                got: scores.dtype(),
            });
        }

        let params = NmsParams::new(
            max_output_size.scalar_i32_value("max_output_size")?,
            iou_threshold.scalar_as_f64("iou_threshold")?,
            score_threshold.scalar_as_f64("score_threshold")?,
        );
        dispatch_float!(boxes.dtype(), NMS_OP, run_nms, boxes, scores, &params, cancel)
    }
}

fn run_nms<T: HostElement>(
    boxes: &HostTensor,
    scores: &HostTensor,
    params: &NmsParams,
    cancel: Option<&CancellationFlag>,
) -> FastNmsResult<HostTensor> {
    let boxes_view = boxes.view::<T>("boxes")?;
    let boxes = BoxesView::from_tensor(&boxes_view)?;
    let scores = scores.view::<T>("scores")?;
    let selection = fast_non_max_suppression_with(boxes, scores.as_slice(), params, cancel)?;
    let k = selection.indices.len();
    HostTensor::new(HostData::I32(selection.indices), Shape::vector(k))
}

fn tanhshrink_op(features: &HostTensor) -> FastNmsResult<HostTensor> {
    dispatch_float!(features.dtype(), TANHSHRINK_OP, run_tanhshrink, features)
}

fn run_tanhshrink<T: HostElement>(features: &HostTensor) -> FastNmsResult<HostTensor> {
    let view = features.view::<T>("features")?;
    HostTensor::from_elements(tanhshrink(view.as_slice())?, features.shape().clone())
}

fn tanhshrink_grad_op(gradients: &HostTensor, features: &HostTensor) -> FastNmsResult<HostTensor> {
    if gradients.shape() != features.shape() {
        return Err(FastNmsError::ShapeMismatch {
            name: "gradients",
            expected: "same shape as features",
            got: gradients.shape().dims().to_vec(),
        });
    }
    if gradients.dtype() != features.dtype() {
        return Err(FastNmsError::DTypeMismatch {
            name: "gradients",
            expected: features.dtype(),
            got: gradients.dtype(),
        });
    }
    dispatch_float!(
        features.dtype(),
        TANHSHRINK_GRAD_OP,
        run_tanhshrink_grad,
        gradients,
        features
    )
}

fn run_tanhshrink_grad<T: HostElement>(
    gradients: &HostTensor,
    features: &HostTensor,
) -> FastNmsResult<HostTensor> {
    let g = gradients.view::<T>("gradients")?;
    let x = features.view::<T>("features")?;
    HostTensor::from_elements(
        tanhshrink_grad(g.as_slice(), x.as_slice())?,
        features.shape().clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::{HostData, HostTensor, OpKind};
    use crate::element::DType;
    use crate::tensor::Shape;
    use crate::util::{ErrorKind, FastNmsError};

    #[test]
    fn op_names_round_trip() {
        for op in OpKind::ALL {
            assert_eq!(OpKind::from_name(op.name()).unwrap(), op);
        }
        let err = OpKind::from_name("SoftNonMaxSuppression").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }

    #[test]
    fn host_tensor_checks_element_count() {
        let err = HostTensor::new(HostData::F32(vec![0.0; 3]), Shape::matrix(1, 4)).unwrap_err();
        assert_eq!(err, FastNmsError::BufferSizeMismatch { needed: 4, got: 3 });
    }

    #[test]
    fn integer_features_are_unimplemented() {
        let x = HostTensor::new(HostData::I32(vec![1, 2]), Shape::vector(2)).unwrap();
        let err = OpKind::Tanhshrink.compute(&[&x], None).unwrap_err();
        assert_eq!(
            err,
            FastNmsError::UnsupportedDType {
                op: "Tanhshrink",
                dtype: DType::I32,
            }
        );
    }

    #[test]
    fn rrelu_is_not_a_registered_op() {
        for name in ["RRelu", "RReluGrad"] {
            let err = OpKind::from_name(name).unwrap_err();
            assert_eq!(err, FastNmsError::UnknownOp(name.to_owned()));
        }
    }

    #[test]
    fn f64_thresholds_are_read_without_narrowing() {
        let score = HostTensor::scalar_f64(0.1);
        assert_eq!(score.scalar_as_f64("score_threshold").unwrap(), 0.1);
        let iou = HostTensor::scalar_f32(0.1);
        assert_eq!(iou.scalar_as_f64("iou_threshold").unwrap(), f64::from(0.1f32));
    }

    #[test]
    fn arity_is_checked() {
        let x = HostTensor::scalar_f32(1.0);
        let err = OpKind::FastNonMaxSuppression.compute(&[&x], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
