//! Runs the JSON fixture cases under `tests/data`.

use fastnms::{fast_non_max_suppression, BoxesView, NmsParams, OrderStrategy};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Fixture {
    cases: Vec<FixtureCase>,
}

#[derive(Debug, Deserialize)]
struct FixtureCase {
    case_id: String,
    boxes: Vec<[f32; 4]>,
    scores: Vec<f32>,
    max_output_size: i32,
    iou_threshold: f32,
    score_threshold: f32,
    expected: Vec<i32>,
}

fn load_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/nms_cases.json");
    let text = fs::read_to_string(&path).expect("fixture file readable");
    serde_json::from_str(&text).expect("fixture parses")
}

#[test]
fn fixture_cases_match_expected_selection() {
    let fixture = load_fixture();
    assert!(!fixture.cases.is_empty());
    for case in &fixture.cases {
        let flat: Vec<f32> = case.boxes.iter().flatten().copied().collect();
        let view = BoxesView::from_slice(&flat, case.boxes.len()).unwrap();
        for order in [OrderStrategy::Sort, OrderStrategy::Heap] {
            let params = NmsParams {
                order,
                ..NmsParams::new(
                    case.max_output_size,
                    f64::from(case.iou_threshold),
                    f64::from(case.score_threshold),
                )
            };
            let out = fast_non_max_suppression(view, &case.scores, &params).unwrap();
            assert_eq!(out, case.expected, "case {} ({order:?})", case.case_id);
        }
    }
}
