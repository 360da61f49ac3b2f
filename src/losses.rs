//! Box regression losses.

use crate::boxes::giou;
use crate::element::Element;
use crate::tensor::BoxesView;
use crate::util::alloc::try_with_capacity;
use crate::util::{FastNmsError, FastNmsResult};

/// Row-wise GIoU loss `1 - giou(y_true[i], y_pred[i])`.
///
/// Both tensors hold `(y1, x1, y2, x2)` rows; corner order within a row does
/// not matter. The result is unreduced, one value per row.
pub fn giou_loss<T: Element>(
    y_true: BoxesView<'_, T>,
    y_pred: BoxesView<'_, T>,
) -> FastNmsResult<Vec<T>> {
    if y_true.len() != y_pred.len() {
        return Err(FastNmsError::ShapeMismatch {
            name: "y_pred",
            expected: "same number of boxes as y_true",
            got: vec![y_pred.len(), 4],
        });
    }
    let mut out = try_with_capacity(y_true.len(), "giou loss")?;
    out.extend(
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| T::from_f64(1.0 - giou(&p, &t))),
    );
    Ok(out)
}

/// Mean of [`giou_loss`] over all rows; 0 for empty input.
pub fn giou_loss_mean<T: Element>(
    y_true: BoxesView<'_, T>,
    y_pred: BoxesView<'_, T>,
) -> FastNmsResult<f64> {
    let losses = giou_loss(y_true, y_pred)?;
    if losses.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = losses.iter().map(|l| l.to_f64()).sum();
    Ok(sum / losses.len() as f64)
}
