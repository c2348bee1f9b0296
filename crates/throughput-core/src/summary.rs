use chrono::NaiveDateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;

use crate::aggregates::{BucketValue, HourlyValue};
use crate::error::Result;
use crate::recommender::EXTRA_NEEDED;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourPeak {
    pub hour: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketPeak {
    pub hour_start: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub staffing_rows: usize,
    pub picking_rows: usize,
    pub order_rows: usize,
    pub collapse_rows: usize,
    /// Sum of `extra_needed` over the collapse window.
    pub collapse_extra_pickers: i64,
    pub peak_w2s: Option<HourPeak>,
    pub peak_late_rate: Option<HourPeak>,
    pub peak_backlog: Option<BucketPeak>,
}

/// Position of the largest value; the first one wins on ties. Missing and NaN
/// values never win.
pub fn stable_argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

pub fn hour_peak(rows: &[HourlyValue]) -> Option<HourPeak> {
    let idx = stable_argmax(rows.iter().map(|row| row.value))?;
    let row = rows[idx];
    row.value.map(|value| HourPeak {
        hour: row.hour,
        value,
    })
}

pub fn bucket_peak(rows: &[BucketValue]) -> Option<BucketPeak> {
    let idx = stable_argmax(rows.iter().map(|row| row.value))?;
    let row = rows[idx];
    row.value.map(|value| BucketPeak {
        hour_start: row.hour_start,
        value,
    })
}

pub struct SummaryInputs<'a> {
    pub staffing_rows: usize,
    pub picking_rows: usize,
    pub order_rows: usize,
    pub collapse: &'a DataFrame,
    pub hourly_w2s: &'a [HourlyValue],
    pub late_rate: &'a [HourlyValue],
    pub backlog: &'a [BucketValue],
}

pub fn summarize(inputs: SummaryInputs<'_>) -> Result<Summary> {
    let collapse_extra_pickers = inputs
        .collapse
        .column(EXTRA_NEEDED)?
        .i64()?
        .into_iter()
        .flatten()
        .sum();

    Ok(Summary {
        staffing_rows: inputs.staffing_rows,
        picking_rows: inputs.picking_rows,
        order_rows: inputs.order_rows,
        collapse_rows: inputs.collapse.height(),
        collapse_extra_pickers,
        peak_w2s: hour_peak(inputs.hourly_w2s),
        peak_late_rate: hour_peak(inputs.late_rate),
        peak_backlog: bucket_peak(inputs.backlog),
    })
}

/// The three peak lines printed at the end of a run.
pub fn peak_lines(summary: &Summary) -> Vec<String> {
    let hour = |peak: Option<HourPeak>, metric: &str| match peak {
        Some(peak) => format!("hour={} {}={:.4}", peak.hour, metric, peak.value),
        None => "no data".to_string(),
    };
    let backlog = match summary.peak_backlog {
        Some(peak) => format!(
            "hour_start={} mean_backlog_hours={:.4}",
            peak.hour_start.format("%Y-%m-%d %H:%M:%S"),
            peak.value
        ),
        None => "no data".to_string(),
    };

    vec![
        format!("Peak W2S Hour: {}", hour(summary.peak_w2s, "mean_w2s")),
        format!(
            "Peak Late-pick Hour: {}",
            hour(summary.peak_late_rate, "late_rate")
        ),
        format!("Peak Backlog Hour: {backlog}"),
    ]
}

/// Renders a DataFrame as a console table.
pub fn frame_table(df: &DataFrame) -> Result<Table> {
    let mut table = new_table();
    table.set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );

    for idx in 0..df.height() {
        let mut row = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            row.push(format_cell(column.as_materialized_series().get(idx)?));
        }
        table.add_row(row);
    }
    Ok(table)
}

pub fn summary_table(summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec!["staffing samples".to_string(), summary.staffing_rows.to_string()]);
    table.add_row(vec!["picking samples".to_string(), summary.picking_rows.to_string()]);
    table.add_row(vec!["orders".to_string(), summary.order_rows.to_string()]);
    table.add_row(vec![
        "collapse-window samples".to_string(),
        summary.collapse_rows.to_string(),
    ]);
    table.add_row(vec![
        "extra pickers needed (collapse window)".to_string(),
        summary.collapse_extra_pickers.to_string(),
    ]);
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_cell(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}
