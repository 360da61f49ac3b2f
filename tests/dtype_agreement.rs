//! Selections must not depend on the element type when values are equal.

use fastnms::{bf16, f16, fast_non_max_suppression, BoxesView, Element, NmsParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Coordinates and scores on a grid that is exact in every dtype.
fn exact_case(rng: &mut StdRng, n: usize) -> (Vec<f32>, Vec<f32>) {
    let mut boxes = Vec::with_capacity(4 * n);
    let mut scores = Vec::with_capacity(n);
    for _ in 0..n {
        let y1 = rng.random_range(0u32..64) as f32;
        let x1 = rng.random_range(0u32..64) as f32;
        let h = rng.random_range(1u32..16) as f32;
        let w = rng.random_range(1u32..16) as f32;
        boxes.extend_from_slice(&[y1, x1, y1 + h, x1 + w]);
        scores.push(rng.random_range(0u32..16) as f32 / 16.0);
    }
    (boxes, scores)
}

fn run_as<T: Element>(boxes: &[f32], scores: &[f32], params: &NmsParams) -> Vec<i32> {
    let boxes_t: Vec<T> = boxes.iter().map(|&v| T::from_f64(v as f64)).collect();
    let scores_t: Vec<T> = scores.iter().map(|&v| T::from_f64(v as f64)).collect();
    let view = BoxesView::from_slice(&boxes_t, scores_t.len()).unwrap();
    fast_non_max_suppression(view, &scores_t, params).unwrap()
}

#[test]
fn all_dtypes_select_the_same_boxes() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50 {
        let n = rng.random_range(0usize..100);
        let (boxes, scores) = exact_case(&mut rng, n);
        let params = NmsParams::new(rng.random_range(0i32..30), 0.45, 0.25);
        let reference = run_as::<f32>(&boxes, &scores, &params);
        assert_eq!(run_as::<f64>(&boxes, &scores, &params), reference);
        assert_eq!(run_as::<f16>(&boxes, &scores, &params), reference);
        assert_eq!(run_as::<bf16>(&boxes, &scores, &params), reference);
    }
}

#[test]
fn half_precision_boundary_decision_uses_widened_math() {
    // A 2x2 box against its top half: IoU is exactly 0.5 in every dtype.
    let boxes = [0.0f32, 0.0, 2.0, 2.0, 0.0, 0.0, 1.0, 2.0];
    let scores = [0.9f32, 0.8];
    let params = NmsParams::new(2, 0.5, 0.0);
    assert_eq!(run_as::<f16>(&boxes, &scores, &params), vec![0, 1]);
    assert_eq!(run_as::<bf16>(&boxes, &scores, &params), vec![0, 1]);

    let params = NmsParams::new(2, 0.499, 0.0);
    assert_eq!(run_as::<f16>(&boxes, &scores, &params), vec![0]);
}
