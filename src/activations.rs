//! Element-wise activations and their gradients.
//!
//! Values are widened to `f64`, transformed, and rounded back to the element
//! type once.

use crate::element::Element;
use crate::util::alloc::try_with_capacity;
use crate::util::{FastNmsError, FastNmsResult};
use rand::Rng;

/// Registered op name of the Tanhshrink forward kernel.
pub const TANHSHRINK_OP: &str = "Tanhshrink";
/// Registered op name of the Tanhshrink gradient kernel.
pub const TANHSHRINK_GRAD_OP: &str = "TanhshrinkGrad";

/// `x - tanh(x)`.
#[inline]
pub fn tanhshrink_scalar(x: f64) -> f64 {
    x - x.tanh()
}

/// Derivative of [`tanhshrink_scalar`]: `tanh(x)^2`.
#[inline]
pub fn tanhshrink_derivative(x: f64) -> f64 {
    let t = x.tanh();
    t * t
}

fn check_same_len(a: usize, b: usize, name: &'static str) -> FastNmsResult<()> {
    if a != b {
        return Err(FastNmsError::ShapeMismatch {
            name,
            expected: "same shape as features",
            got: vec![b],
        });
    }
    Ok(())
}

fn map_unary<T: Element>(
    features: &[T],
    buffer: &'static str,
    f: impl Fn(f64) -> f64,
) -> FastNmsResult<Vec<T>> {
    let mut out = try_with_capacity(features.len(), buffer)?;
    out.extend(features.iter().map(|&x| T::from_f64(f(x.to_f64()))));
    Ok(out)
}

/// Applies Tanhshrink element-wise.
pub fn tanhshrink<T: Element>(features: &[T]) -> FastNmsResult<Vec<T>> {
    map_unary(features, "tanhshrink activations", tanhshrink_scalar)
}

/// Backpropagates `gradients` through Tanhshrink evaluated at `features`.
pub fn tanhshrink_grad<T: Element>(gradients: &[T], features: &[T]) -> FastNmsResult<Vec<T>> {
    check_same_len(features.len(), gradients.len(), "gradients")?;
    let mut out = try_with_capacity(features.len(), "tanhshrink backprops")?;
    out.extend(
        gradients
            .iter()
            .zip(features)
            .map(|(&g, &x)| T::from_f64(g.to_f64() * tanhshrink_derivative(x.to_f64()))),
    );
    Ok(out)
}

/// Configuration for randomized leaky ReLU.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RreluParams {
    /// Lower bound of the negative slope.
    pub lower: f64,
    /// Upper bound of the negative slope.
    pub upper: f64,
    /// Sample slopes per element when true; use the bound midpoint otherwise.
    pub training: bool,
}

impl Default for RreluParams {
    fn default() -> Self {
        Self {
            lower: 0.125,
            upper: 1.0 / 3.0,
            training: false,
        }
    }
}

impl RreluParams {
    /// Checks that the bounds are finite, non-negative and ordered.
    pub fn validate(&self) -> FastNmsResult<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(FastNmsError::InvalidArgument("rrelu bounds must be finite"));
        }
        if self.lower < 0.0 {
            return Err(FastNmsError::InvalidArgument("rrelu lower bound must be non-negative"));
        }
        if self.lower > self.upper {
            return Err(FastNmsError::InvalidArgument("rrelu lower bound exceeds upper bound"));
        }
        Ok(())
    }
}

/// Randomized leaky ReLU; returns the activations and the slopes used.
///
/// Non-negative inputs pass through. The slope tensor is needed by
/// [`rrelu_grad`].
pub fn rrelu<T: Element, R: Rng>(
    features: &[T],
    params: &RreluParams,
    rng: &mut R,
) -> FastNmsResult<(Vec<T>, Vec<T>)> {
    params.validate()?;
    let mut activations = try_with_capacity(features.len(), "rrelu activations")?;
    let mut alpha = try_with_capacity(features.len(), "rrelu alpha")?;
    let midpoint = (params.lower + params.upper) / 2.0;
    for &x in features {
        let a = if params.training {
            rng.random_range(params.lower..=params.upper)
        } else {
            midpoint
        };
        let x = x.to_f64();
        activations.push(T::from_f64(if x >= 0.0 { x } else { a * x }));
        alpha.push(T::from_f64(a));
    }
    Ok((activations, alpha))
}

/// Backpropagates `gradients` through RReLU given the forward slopes.
pub fn rrelu_grad<T: Element>(
    gradients: &[T],
    features: &[T],
    alpha: &[T],
) -> FastNmsResult<Vec<T>> {
    check_same_len(features.len(), gradients.len(), "gradients")?;
    check_same_len(features.len(), alpha.len(), "alpha")?;
    let mut out = try_with_capacity(features.len(), "rrelu backprops")?;
    out.extend(
        gradients
            .iter()
            .zip(features)
            .zip(alpha)
            .map(|((&g, &x), &a)| {
                if x.to_f64() >= 0.0 {
                    g
                } else {
                    T::from_f64(g.to_f64() * a.to_f64())
                }
            }),
    );
    Ok(out)
}
