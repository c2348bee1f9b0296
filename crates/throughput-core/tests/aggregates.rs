mod common;

use throughput_core::aggregates::{
    backlog_by_hour, backlog_values, hourly_values, hourly_w2s, late_rate_by_hour, w2s_heatmap,
    HourlyValue, W2sHeatmap, LATE_RATE, MEAN_W2S,
};
use throughput_core::metrics::{apply_order_metrics, apply_w2s};
use throughput_core::ZeroPickerPolicy;

use common::{date, orders, picking, ts};

#[test]
fn hourly_w2s_has_one_sorted_row_per_hour() {
    let df = picking(&[
        ("2025-01-01 14:00:00", 400, 1),
        ("2025-01-01 02:00:00", 300, 1),
        ("2025-01-02 02:30:00", 500, 1),
        ("2025-01-01 03:00:00", 200, 0),
        ("2025-01-01 03:10:00", 600, 2),
    ]);
    let df = apply_w2s(&df, ZeroPickerPolicy::Exclude).unwrap();
    let hourly = hourly_values(&hourly_w2s(&df).unwrap(), MEAN_W2S).unwrap();

    assert_eq!(
        hourly,
        vec![
            HourlyValue {
                hour: 2,
                value: Some(400.0)
            },
            HourlyValue {
                hour: 3,
                value: Some(300.0)
            },
            HourlyValue {
                hour: 14,
                value: Some(400.0)
            },
        ]
    );
}

#[test]
fn late_rate_is_fraction_of_late_orders_per_hour() {
    let df = orders(&[
        (
            "2025-01-01 02:00:00",
            "2025-01-01 02:30:00",
            "2025-01-01 03:00:00",
            "2025-01-01 03:30:00",
        ),
        (
            "2025-01-01 02:10:00",
            "2025-01-01 02:40:00",
            "2025-01-01 04:00:00",
            "2025-01-01 03:10:00",
        ),
        (
            "2025-01-02 02:20:00",
            "2025-01-02 02:40:00",
            "2025-01-02 03:00:00",
            "2025-01-02 03:05:00",
        ),
        (
            "2025-01-01 09:00:00",
            "2025-01-01 09:20:00",
            "2025-01-01 10:00:00",
            "2025-01-01 09:50:00",
        ),
    ]);
    let df = apply_order_metrics(&df).unwrap();
    let rates = hourly_values(&late_rate_by_hour(&df).unwrap(), LATE_RATE).unwrap();

    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].hour, 2);
    assert!((rates[0].value.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(rates[1].hour, 9);
    assert_eq!(rates[1].value, Some(0.0));
}

#[test]
fn backlog_buckets_by_calendar_hour() {
    let df = orders(&[
        (
            "2025-01-02 02:30:00",
            "2025-01-02 02:40:00",
            "2025-01-02 04:00:00",
            "2025-01-02 03:30:00",
        ),
        (
            "2025-01-01 02:00:00",
            "2025-01-01 02:30:00",
            "2025-01-01 03:00:00",
            "2025-01-01 03:30:00",
        ),
        (
            "2025-01-01 02:45:00",
            "2025-01-01 02:50:00",
            "2025-01-01 04:00:00",
            "2025-01-01 03:15:00",
        ),
    ]);
    let df = apply_order_metrics(&df).unwrap();
    let backlog = backlog_values(&backlog_by_hour(&df).unwrap()).unwrap();

    // Same hour of day on two dates stays two buckets.
    assert_eq!(backlog.len(), 2);
    assert_eq!(backlog[0].hour_start, ts("2025-01-01 02:00:00"));
    assert!((backlog[0].value.unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(backlog[1].hour_start, ts("2025-01-02 02:00:00"));
    assert!((backlog[1].value.unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn heatmap_pivots_date_by_hour() {
    let df = picking(&[
        ("2025-01-01 01:00:00", 300, 1),
        ("2025-01-01 01:30:00", 600, 2),
        ("2025-01-02 01:00:00", 200, 1),
        ("2025-01-01 02:00:00", 100, 1),
        ("2025-01-02 05:00:00", 100, 0),
    ]);
    let df = apply_w2s(&df, ZeroPickerPolicy::Exclude).unwrap();
    let heatmap = w2s_heatmap(&df).unwrap();

    assert_eq!(heatmap.dates, vec![date("2025-01-01"), date("2025-01-02")]);
    assert_eq!(heatmap.hours, vec![1, 2]);
    assert_eq!(heatmap.get(date("2025-01-01"), 1), Some(300.0));
    assert_eq!(heatmap.get(date("2025-01-02"), 1), Some(200.0));
    assert_eq!(heatmap.get(date("2025-01-02"), 2), None);
    assert_eq!(heatmap.get(date("2025-01-02"), 5), None);
    assert_eq!(heatmap.value_range(), Some((100.0, 300.0)));
}

#[test]
fn heatmap_hours_sort_numerically_and_dates_chronologically() {
    let df = picking(&[
        ("2025-01-03 10:00:00", 500, 1),
        ("2025-01-01 02:00:00", 200, 1),
        ("2025-01-03 02:00:00", 400, 2),
        ("2025-01-01 23:00:00", 90, 1),
    ]);
    let df = apply_w2s(&df, ZeroPickerPolicy::Exclude).unwrap();
    let heatmap = w2s_heatmap(&df).unwrap();

    assert_eq!(heatmap.dates, vec![date("2025-01-01"), date("2025-01-03")]);
    assert_eq!(heatmap.hours, vec![2, 10, 23]);
    assert_eq!(
        heatmap.cells,
        vec![
            vec![Some(200.0), None, Some(90.0)],
            vec![Some(200.0), Some(500.0), None],
        ]
    );
}

#[test]
fn heatmap_without_ratios_is_empty() {
    let df = picking(&[("2025-01-01 01:00:00", 100, 0)]);
    let df = apply_w2s(&df, ZeroPickerPolicy::Exclude).unwrap();
    assert_eq!(w2s_heatmap(&df).unwrap(), W2sHeatmap::default());
}
