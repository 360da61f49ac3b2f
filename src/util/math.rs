//! Numeric helpers shared by the kernels.

use crate::util::{FastNmsError, FastNmsResult};

/// Largest candidate count whose indices all fit in an `i32`.
pub(crate) const MAX_INDEXABLE: usize = i32::MAX as usize + 1;

/// Clamps an IoU threshold into `[0, 1]`; NaN is rejected.
pub(crate) fn clamp_unit(value: f64) -> FastNmsResult<f64> {
    if value.is_nan() {
        return Err(FastNmsError::InvalidArgument("iou_threshold must not be NaN"));
    }
    Ok(value.clamp(0.0, 1.0))
}

/// Folds `-0.0` onto `+0.0` so numerically equal scores tie on index.
#[inline]
pub(crate) fn canonical_zero(value: f64) -> f64 {
    value + 0.0
}

/// Converts a candidate index to the int32 output representation.
#[inline]
pub(crate) fn index_to_i32(index: usize) -> FastNmsResult<i32> {
    i32::try_from(index).map_err(|_| FastNmsError::Internal("selected index exceeds i32 range"))
}
