mod common;

use std::fs;

use throughput_core::export::{
    ensure_output_dir, recommendation_rows, write_recommendations, write_summary_json,
    RECOMMENDATIONS_FILE, SUMMARY_FILE,
};
use throughput_core::metrics::apply_w2s;
use throughput_core::recommender::predict_optimal_pickers;
use throughput_core::summary::{HourPeak, Summary};
use throughput_core::ZeroPickerPolicy;

use common::picking;

fn recommendations() -> polars::prelude::DataFrame {
    let df = picking(&[
        ("2025-01-01 02:00:00", 300, 1),
        ("2025-01-01 03:15:00", 900, 2),
    ]);
    let df = apply_w2s(&df, ZeroPickerPolicy::Exclude).unwrap();
    predict_optimal_pickers(&df, 350.0).unwrap()
}

#[test]
fn output_dir_creation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("outputs").join("run");

    ensure_output_dir(&nested).unwrap();
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn recommendation_rows_format_timestamps() {
    let rows = recommendation_rows(&recommendations()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].timestamp, "2025-01-01 02:00:00");
    assert_eq!(rows[0].w2s, Some(300.0));
    assert_eq!(rows[0].optimal_pickers, Some(1));
    assert_eq!(rows[0].extra_needed, Some(0));
    assert_eq!(rows[1].optimal_pickers, Some(3));
    assert_eq!(rows[1].extra_needed, Some(1));
}

#[test]
fn recommendations_csv_has_fixed_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recommendations(&recommendations(), dir.path()).unwrap();
    assert_eq!(path, dir.path().join(RECOMMENDATIONS_FILE));

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "timestamp,active_pickers,units_picked,w2s,optimal_pickers,extra_needed"
    );
    assert!(lines[1].starts_with("2025-01-01 02:00:00,1,300,"));
    assert!(lines[1].ends_with(",1,0"));
    assert!(lines[2].starts_with("2025-01-01 03:15:00,2,900,"));
    assert!(lines[2].ends_with(",3,1"));

    // A second write replaces the file.
    let empty = recommendations().head(Some(0));
    write_recommendations(&empty, dir.path()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn summary_json_round_trips_through_serde() {
    let summary = Summary {
        staffing_rows: 3,
        picking_rows: 6,
        order_rows: 3,
        collapse_rows: 3,
        collapse_extra_pickers: 2,
        peak_w2s: Some(HourPeak {
            hour: 2,
            value: 450.0,
        }),
        peak_late_rate: None,
        peak_backlog: None,
    };

    let dir = tempfile::tempdir().unwrap();
    let path = write_summary_json(&summary, dir.path()).unwrap();
    assert_eq!(path, dir.path().join(SUMMARY_FILE));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["picking_rows"], 6);
    assert_eq!(value["peak_w2s"]["hour"], 2);
    assert!(value["peak_late_rate"].is_null());
}
