//! Error types for fastnms.

use crate::element::DType;
use thiserror::Error;

/// Result alias for fastnms operations.
pub type FastNmsResult<T> = std::result::Result<T, FastNmsError>;

/// Abstract failure category surfaced to a host framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Shape, rank, dtype agreement or parameter value errors.
    InvalidArgument,
    /// Element type or op outside the supported set.
    Unimplemented,
    /// Intermediate buffer allocation failed.
    ResourceExhausted,
    /// The caller requested cancellation.
    Cancelled,
    /// Broken internal invariant.
    Internal,
}

/// Errors that can occur when running fastnms kernels.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FastNmsError {
    /// A parameter value is outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A tensor has the wrong rank or dimensions.
    #[error("invalid shape for `{name}`: expected {expected}, got {got:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: &'static str,
        got: Vec<usize>,
    },
    /// A buffer length does not match its declared shape.
    #[error("buffer length {got} does not match shape element count {needed}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// Two tensors that must share an element type do not.
    #[error("dtype mismatch for `{name}`: expected {expected}, got {got}")]
    DTypeMismatch {
        name: &'static str,
        expected: DType,
        got: DType,
    },
    /// The element type is not supported by the op.
    #[error("unimplemented: `{op}` has no kernel for element type {dtype}")]
    UnsupportedDType { op: &'static str, dtype: DType },
    /// No op is registered under the given name.
    #[error("unimplemented: no op registered as `{0}`")]
    UnknownOp(String),
    /// Reserving an intermediate buffer failed.
    #[error("resource exhausted: could not reserve {requested} elements for {buffer}")]
    ResourceExhausted {
        buffer: &'static str,
        requested: usize,
    },
    /// The caller's cancellation flag was raised.
    #[error("cancelled")]
    Cancelled,
    /// Invariant violation; a bug if ever observed.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl FastNmsError {
    /// Maps the error onto the abstract host-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_)
            | Self::ShapeMismatch { .. }
            | Self::BufferSizeMismatch { .. }
            | Self::DTypeMismatch { .. } => ErrorKind::InvalidArgument,
            Self::UnsupportedDType { .. } | Self::UnknownOp(_) => ErrorKind::Unimplemented,
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
