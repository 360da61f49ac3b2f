//! Borrowed tensor views for the input binding.
//!
//! `TensorView` pairs a flat row-major slice with a [`Shape`]; the slice length
//! must equal the shape's element count. `BoxesView` is the `[N, 4]`
//! specialisation the suppression kernel reads boxes through, with rows laid
//! out as `(y1, x1, y2, x2)`.

use crate::boxes::BBox;
use crate::element::Element;
use crate::util::{FastNmsError, FastNmsResult};

/// Dense row-major tensor shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Creates a shape from explicit dimensions.
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    /// Rank-0 shape.
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    /// Rank-1 shape `[len]`.
    pub fn vector(len: usize) -> Self {
        Self(vec![len])
    }

    /// Rank-2 shape `[rows, cols]`.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self(vec![rows, cols])
    }

    /// Returns the dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Returns the product of all dimensions (1 for scalars).
    pub fn num_elements(&self) -> FastNmsResult<usize> {
        self.0
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(FastNmsError::InvalidArgument("shape element count overflows usize"))
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

/// Borrowed dense tensor.
#[derive(Clone, Debug)]
pub struct TensorView<'a, T> {
    data: &'a [T],
    shape: Shape,
}

impl<'a, T> TensorView<'a, T> {
    /// Creates a view, checking the slice length against the shape.
    pub fn new(data: &'a [T], shape: Shape) -> FastNmsResult<Self> {
        let needed = shape.num_elements()?;
        if data.len() != needed {
            return Err(FastNmsError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Returns the shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the single value of a rank-0 tensor.
    pub fn scalar(&self, name: &'static str) -> FastNmsResult<&'a T> {
        if self.shape.rank() != 0 {
            return Err(FastNmsError::ShapeMismatch {
                name,
                expected: "scalar",
                got: self.shape.dims().to_vec(),
            });
        }
        self.data
            .first()
            .ok_or(FastNmsError::Internal("scalar tensor without data"))
    }
}

/// Borrowed `[N, 4]` box tensor with rows `(y1, x1, y2, x2)`.
#[derive(Copy, Clone, Debug)]
pub struct BoxesView<'a, T> {
    data: &'a [T],
    len: usize,
}

impl<'a, T: Element> BoxesView<'a, T> {
    /// Creates a view over `len` boxes stored contiguously.
    pub fn from_slice(data: &'a [T], len: usize) -> FastNmsResult<Self> {
        let needed = len
            .checked_mul(4)
            .ok_or(FastNmsError::InvalidArgument("box count overflows usize"))?;
        if data.len() != needed {
            return Err(FastNmsError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, len })
    }

    /// Interprets a rank-2 tensor with trailing dimension 4 as boxes.
    pub fn from_tensor(tensor: &TensorView<'a, T>) -> FastNmsResult<Self> {
        match tensor.shape().dims() {
            &[n, 4] => Self::from_slice(tensor.as_slice(), n),
            dims => Err(FastNmsError::ShapeMismatch {
                name: "boxes",
                expected: "[N, 4]",
                got: dims.to_vec(),
            }),
        }
    }

    /// Returns the number of boxes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when there are no boxes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the raw coordinates of box `index`.
    pub fn row(&self, index: usize) -> Option<&'a [T]> {
        let start = index.checked_mul(4)?;
        self.data.get(start..start.checked_add(4)?)
    }

    /// Returns box `index` widened to `f64`.
    pub fn bbox(&self, index: usize) -> Option<BBox> {
        self.row(index)
            .map(|r| BBox::new(r[0].to_f64(), r[1].to_f64(), r[2].to_f64(), r[3].to_f64()))
    }

    /// Iterates over all boxes widened to `f64`.
    pub fn iter(&self) -> impl Iterator<Item = BBox> + 'a {
        self.data
            .chunks_exact(4)
            .map(|r| BBox::new(r[0].to_f64(), r[1].to_f64(), r[2].to_f64(), r[3].to_f64()))
    }
}
