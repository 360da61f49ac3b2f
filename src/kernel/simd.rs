//! SIMD overlap kernel using the `wide` crate.
//!
//! Tests the candidate against four selected boxes per step with `f64x4`,
//! using the same operation order as the scalar kernel so lane results are
//! bit-identical to it.

use crate::boxes::BBox;
use crate::kernel::{OverlapKernel, SelectedBoxes};
use wide::{f64x4, CmpGt};

const LANES: usize = 4;

#[inline]
fn load_f64x4(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

/// Four-lane overlap test with a scalar tail.
pub struct SimdOverlap;

impl OverlapKernel for SimdOverlap {
    fn any_overlap(candidate: &BBox, selected: &SelectedBoxes, iou_threshold: f64) -> bool {
        let n = selected.len();
        let area = candidate.area();
        let simd_end = n / LANES * LANES;

        let cy1 = f64x4::splat(candidate.y1);
        let cx1 = f64x4::splat(candidate.x1);
        let cy2 = f64x4::splat(candidate.y2);
        let cx2 = f64x4::splat(candidate.x2);
        let carea = f64x4::splat(area);
        let thr = f64x4::splat(iou_threshold);

        let mut i = 0;
        while i < simd_end {
            let sy1 = load_f64x4(&selected.y1[i..]);
            let sx1 = load_f64x4(&selected.x1[i..]);
            let sy2 = load_f64x4(&selected.y2[i..]);
            let sx2 = load_f64x4(&selected.x2[i..]);
            let sarea = load_f64x4(&selected.area[i..]);

            let ih = (cy2.min(sy2) - cy1.max(sy1)).max(f64x4::ZERO);
            let iw = (cx2.min(sx2) - cx1.max(sx1)).max(f64x4::ZERO);
            let inter = ih * iw;
            let union = carea + sarea - inter;
            let iou = union.cmp_gt(f64x4::ZERO).blend(inter / union, f64x4::ZERO);
            if iou.cmp_gt(thr).move_mask() != 0 {
                return true;
            }
            i += LANES;
        }

        (simd_end..n).any(|i| selected.iou_at(candidate, area, i) > iou_threshold)
    }
}
