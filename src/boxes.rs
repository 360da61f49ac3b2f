//! Axis-aligned box geometry in widened precision.
//!
//! All arithmetic runs in `f64`. Extents are clamped at zero, so a box with
//! `y2 < y1` or `x2 < x1` has zero area rather than a negative one.

/// Axis-aligned box `(y1, x1, y2, x2)` in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub y1: f64,
    pub x1: f64,
    pub y2: f64,
    pub x2: f64,
}

impl BBox {
    /// Creates a box from its corner coordinates.
    pub fn new(y1: f64, x1: f64, y2: f64, x2: f64) -> Self {
        Self { y1, x1, y2, x2 }
    }

    /// Height clamped at zero. NaN coordinates yield zero.
    #[inline]
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Width clamped at zero. NaN coordinates yield zero.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Area clamped at zero.
    #[inline]
    pub fn area(&self) -> f64 {
        self.height() * self.width()
    }

    /// True when `y2 >= y1` and `x2 >= x1`.
    pub fn is_valid(&self) -> bool {
        self.y2 >= self.y1 && self.x2 >= self.x1
    }

    /// True when the box may be selected: finite coordinates and positive,
    /// finite area.
    pub fn is_selectable(&self) -> bool {
        let finite =
            self.y1.is_finite() && self.x1.is_finite() && self.y2.is_finite() && self.x2.is_finite();
        if !finite {
            return false;
        }
        let area = self.area();
        area > 0.0 && area.is_finite()
    }

    /// Area of the overlap with `other`.
    #[inline]
    pub fn intersection(&self, other: &BBox) -> f64 {
        let ih = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let iw = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        ih * iw
    }

    /// Reorders corners so that `y1 <= y2` and `x1 <= x2`.
    pub fn normalized(&self) -> BBox {
        BBox {
            y1: self.y1.min(self.y2),
            x1: self.x1.min(self.x2),
            y2: self.y1.max(self.y2),
            x2: self.x1.max(self.x2),
        }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn enclosing(&self, other: &BBox) -> BBox {
        BBox {
            y1: self.y1.min(other.y1),
            x1: self.x1.min(other.x1),
            y2: self.y2.max(other.y2),
            x2: self.x2.max(other.x2),
        }
    }
}

/// Combines an intersection and two areas into an IoU; 0 for an empty union.
#[inline]
pub(crate) fn iou_from_parts(inter: f64, area_a: f64, area_b: f64) -> f64 {
    let union = area_a + area_b - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Intersection-over-union of two boxes.
pub fn iou(a: &BBox, b: &BBox) -> f64 {
    iou_from_parts(a.intersection(b), a.area(), b.area())
}

/// Generalized IoU of two boxes.
///
/// Corners are normalized first, so swapped coordinates describe the same box.
/// Returns the plain IoU when the enclosing box has zero area.
pub fn giou(a: &BBox, b: &BBox) -> f64 {
    let a = a.normalized();
    let b = b.normalized();
    let inter = a.intersection(&b);
    let union = a.area() + b.area() - inter;
    let iou = iou_from_parts(inter, a.area(), b.area());
    let enclose = a.enclosing(&b).area();
    if enclose > 0.0 {
        iou - (enclose - union) / enclose
    } else {
        iou
    }
}
