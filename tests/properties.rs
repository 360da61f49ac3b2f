//! Universal properties of the suppression output over random inputs.

use fastnms::{fast_non_max_suppression, iou, BBox, BoxesView, NmsParams, OrderStrategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Case {
    boxes: Vec<f32>,
    scores: Vec<f32>,
}

impl Case {
    fn bbox(&self, i: usize) -> BBox {
        let r = &self.boxes[4 * i..4 * i + 4];
        BBox::new(r[0] as f64, r[1] as f64, r[2] as f64, r[3] as f64)
    }

    fn run(&self, params: &NmsParams) -> Vec<i32> {
        let view = BoxesView::from_slice(&self.boxes, self.scores.len()).unwrap();
        fast_non_max_suppression(view, &self.scores, params).unwrap()
    }
}

/// Random boxes in a 100x100 frame, some degenerate, scores with duplicates
/// and occasional non-finite values.
fn random_case(rng: &mut StdRng, n: usize) -> Case {
    let mut boxes = Vec::with_capacity(4 * n);
    let mut scores = Vec::with_capacity(n);
    for _ in 0..n {
        let y1 = rng.random_range(0.0f32..100.0);
        let x1 = rng.random_range(0.0f32..100.0);
        let (h, w) = if rng.random_bool(0.05) {
            (0.0, rng.random_range(-5.0f32..5.0))
        } else {
            (rng.random_range(1.0f32..30.0), rng.random_range(1.0f32..30.0))
        };
        boxes.extend_from_slice(&[y1, x1, y1 + h, x1 + w]);
        let score = match rng.random_range(0u32..40) {
            0 => f32::NAN,
            1 => f32::INFINITY,
            // coarse grid produces plenty of ties
            _ => (rng.random_range(0u32..20) as f32) / 20.0,
        };
        scores.push(score);
    }
    Case { boxes, scores }
}

fn random_params(rng: &mut StdRng) -> NmsParams {
    NmsParams::new(
        rng.random_range(0i32..40),
        rng.random_range(0.0f64..1.0),
        rng.random_range(-0.1f64..0.6),
    )
}

#[test]
fn output_satisfies_universal_properties() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let n = rng.random_range(0usize..120);
        let case = random_case(&mut rng, n);
        let params = random_params(&mut rng);
        let out = case.run(&params);

        // bound
        assert!(out.len() <= params.max_output_size as usize);

        for (pos, &o) in out.iter().enumerate() {
            let o = o as usize;
            let score = case.scores[o];
            // threshold and finiteness
            assert!(score.is_finite());
            assert!(f64::from(score) >= params.score_threshold);
            // validity
            assert!(case.bbox(o).area() > 0.0);
            // separation against every earlier pick
            for &p in &out[..pos] {
                let overlap = iou(&case.bbox(p as usize), &case.bbox(o));
                assert!(overlap <= params.iou_threshold);
            }
        }

        // score monotonicity with index tie-break
        for pair in out.windows(2) {
            let (a, b) = (pair[0] as usize, pair[1] as usize);
            assert!(case.scores[a] >= case.scores[b]);
            if case.scores[a] == case.scores[b] {
                assert!(a < b);
            }
        }

        // no duplicates
        let mut sorted = out.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), out.len());
    }
}

#[test]
fn output_is_maximal_under_the_cap() {
    // Every eligible box left out was either suppressed by an earlier pick or
    // the cap was reached.
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let n = rng.random_range(1usize..80);
        let case = random_case(&mut rng, n);
        let params = random_params(&mut rng);
        let out = case.run(&params);
        if out.len() == params.max_output_size as usize {
            continue;
        }
        let picked: Vec<usize> = out.iter().map(|&o| o as usize).collect();
        for i in 0..n {
            let s = case.scores[i];
            let eligible = s.is_finite()
                && f64::from(s) >= params.score_threshold
                && case.bbox(i).is_selectable();
            if !eligible || picked.contains(&i) {
                continue;
            }
            let suppressed = picked.iter().any(|&p| {
                iou(&case.bbox(p), &case.bbox(i)) > params.iou_threshold
            });
            assert!(suppressed, "box {i} should have been selected");
        }
    }
}

#[test]
fn unit_threshold_returns_every_eligible_box_in_score_order() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let n = rng.random_range(0usize..60);
        let case = random_case(&mut rng, n);
        let params = NmsParams::new(1000, 1.0, 0.25);
        let out = case.run(&params);

        let mut expected: Vec<usize> = (0..n)
            .filter(|&i| {
                let s = case.scores[i];
                s.is_finite() && s >= 0.25 && case.bbox(i).is_selectable()
            })
            .collect();
        expected.sort_by(|&a, &b| {
            case.scores[b]
                .partial_cmp(&case.scores[a])
                .unwrap()
                .then(a.cmp(&b))
        });
        let expected: Vec<i32> = expected.into_iter().map(|i| i as i32).collect();
        assert_eq!(out, expected);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let mut rng = StdRng::seed_from_u64(99);
    let case = random_case(&mut rng, 500);
    let params = NmsParams::new(50, 0.4, 0.1);
    let first = case.run(&params);
    for _ in 0..5 {
        assert_eq!(case.run(&params), first);
    }
}

#[test]
fn ordering_strategy_never_changes_the_result() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..100 {
        let n = rng.random_range(0usize..150);
        let case = random_case(&mut rng, n);
        let base = random_params(&mut rng);
        let results: Vec<Vec<i32>> = [OrderStrategy::Auto, OrderStrategy::Sort, OrderStrategy::Heap]
            .into_iter()
            .map(|order| {
                case.run(&NmsParams {
                    order,
                    ..base.clone()
                })
            })
            .collect();
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }
}

#[test]
fn top_score_tie_selects_lower_index_first() {
    let boxes = [
        50.0f32, 50.0, 60.0, 60.0, //
        0.0, 0.0, 10.0, 10.0, //
        20.0, 20.0, 30.0, 30.0,
    ];
    let scores = [0.3f32, 0.8, 0.8];
    let view = BoxesView::from_slice(&boxes, 3).unwrap();
    let out = fast_non_max_suppression(view, &scores, &NmsParams::default()).unwrap();
    assert_eq!(out, vec![1, 2, 0]);
}
