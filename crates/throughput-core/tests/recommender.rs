use polars::prelude::*;
use throughput_core::recommender::{
    extra_needed, optimal_pickers, predict_optimal_pickers, EXTRA_NEEDED, OPTIMAL_PICKERS,
};
use throughput_core::AnalysisError;

fn sample() -> DataFrame {
    df!(
        "units_picked" => &[300i64, 1000, 100, 700],
        "active_pickers" => &[1i64, 2, 5, 2],
    )
    .unwrap()
}

#[test]
fn recommends_ceiling_of_units_over_target() {
    let df = predict_optimal_pickers(&sample(), 350.0).unwrap();

    let optimal = df.column(OPTIMAL_PICKERS).unwrap().i64().unwrap();
    let extra = df.column(EXTRA_NEEDED).unwrap().i64().unwrap();

    assert_eq!(optimal.get(0), Some(1));
    assert_eq!(extra.get(0), Some(0));
    assert_eq!(optimal.get(1), Some(3));
    assert_eq!(extra.get(1), Some(1));
    assert_eq!(optimal.get(2), Some(1));
    assert_eq!(extra.get(2), Some(0));
    // Exactly on target needs no rounding up.
    assert_eq!(optimal.get(3), Some(2));
    assert_eq!(extra.get(3), Some(0));
}

#[test]
fn extra_needed_is_never_negative() {
    let df = predict_optimal_pickers(&sample(), 50.0).unwrap();
    let extra = df.column(EXTRA_NEEDED).unwrap().i64().unwrap();
    assert!(extra.into_iter().flatten().all(|value| value >= 0));

    assert_eq!(extra_needed(2, 5), 0);
    assert_eq!(extra_needed(5, 2), 3);
}

#[test]
fn rerunning_on_own_output_is_idempotent() {
    let once = predict_optimal_pickers(&sample(), 350.0).unwrap();
    let twice = predict_optimal_pickers(&once, 350.0).unwrap();

    assert_eq!(once.width(), twice.width());
    assert!(once.equals_missing(&twice));
}

#[test]
fn non_positive_target_is_rejected() {
    for target in [0.0, -10.0, f64::NAN] {
        let err = predict_optimal_pickers(&sample(), target).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}

#[test]
fn optimal_pickers_rounds_up() {
    assert_eq!(optimal_pickers(351, 350.0), 2);
    assert_eq!(optimal_pickers(0, 350.0), 0);
}
