//! Per-hour aggregates over the enriched picking and order tables.
//!
//! Every aggregate has exactly one row per key present in the data, sorted by key.
//! Keys without samples are absent rather than zero-filled.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use throughput_parser::naive_from_micros;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::metrics::{BACKLOG_HOURS, HOUR_START, LATE, PICK_HOUR_ONLY, W2S};
use crate::schema::{HOUR, PICK_START, TIMESTAMP};

pub const MEAN_W2S: &str = "mean_w2s";
pub const LATE_RATE: &str = "late_rate";
pub const MEAN_BACKLOG_HOURS: &str = "mean_backlog_hours";
const DATE: &str = "date";

/// Mean `w2s` per hour of day. Columns: `hour`, `mean_w2s`.
pub fn hourly_w2s(picking: &DataFrame) -> Result<DataFrame> {
    let df = picking
        .clone()
        .lazy()
        .filter(col(W2S).is_not_null())
        .group_by([col(HOUR)])
        .agg([col(W2S).mean().alias(MEAN_W2S)])
        .sort([HOUR], SortMultipleOptions::default())
        .collect()?;
    debug!(rows = df.height(), "aggregated w2s per hour");
    Ok(df)
}

/// Fraction of late orders per pick-start hour. Columns: `hour`, `late_rate`.
pub fn late_rate_by_hour(orders: &DataFrame) -> Result<DataFrame> {
    let df = orders
        .clone()
        .lazy()
        .filter(col(LATE).is_not_null())
        .group_by([col(PICK_HOUR_ONLY)])
        .agg([col(LATE).cast(DataType::Float64).mean().alias(LATE_RATE)])
        .sort([PICK_HOUR_ONLY], SortMultipleOptions::default())
        .select([col(PICK_HOUR_ONLY).alias(HOUR), col(LATE_RATE)])
        .collect()?;
    debug!(rows = df.height(), "aggregated late-pick rate per hour");
    Ok(df)
}

/// Mean backlog per calendar hour bucket of `pick_start`.
/// Columns: `hour_start`, `mean_backlog_hours`.
pub fn backlog_by_hour(orders: &DataFrame) -> Result<DataFrame> {
    let df = orders
        .clone()
        .lazy()
        .sort([PICK_START], SortMultipleOptions::default())
        .filter(col(BACKLOG_HOURS).is_not_null())
        .group_by([col(HOUR_START)])
        .agg([col(BACKLOG_HOURS).mean().alias(MEAN_BACKLOG_HOURS)])
        .sort([HOUR_START], SortMultipleOptions::default())
        .collect()?;
    debug!(rows = df.height(), "aggregated backlog per hour bucket");
    Ok(df)
}

/// One row of an hour-of-day aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyValue {
    pub hour: i64,
    pub value: Option<f64>,
}

/// One row of the calendar-hour backlog aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketValue {
    pub hour_start: NaiveDateTime,
    pub value: Option<f64>,
}

pub fn hourly_values(aggregate: &DataFrame, value_column: &str) -> Result<Vec<HourlyValue>> {
    let hours = aggregate.column(HOUR)?.i64()?;
    let values = aggregate.column(value_column)?.f64()?;

    Ok(hours
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(hour, value)| hour.map(|hour| HourlyValue { hour, value }))
        .collect())
}

pub fn backlog_values(aggregate: &DataFrame) -> Result<Vec<BucketValue>> {
    let buckets = aggregate.column(HOUR_START)?.datetime()?;
    let values = aggregate.column(MEAN_BACKLOG_HOURS)?.f64()?;

    let mut rows = Vec::with_capacity(aggregate.height());
    for idx in 0..aggregate.height() {
        let Some(micros) = buckets.get(idx) else {
            continue;
        };
        let hour_start = naive_from_micros(micros).ok_or_else(|| {
            AnalysisError::Validation(format!("hour bucket {micros} is out of range"))
        })?;
        rows.push(BucketValue {
            hour_start,
            value: values.get(idx),
        });
    }
    Ok(rows)
}

/// Mean `w2s` by calendar date (rows) and hour of day (columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct W2sHeatmap {
    pub dates: Vec<NaiveDate>,
    pub hours: Vec<i64>,
    /// `cells[date_idx][hour_idx]`; `None` where no sample exists.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl W2sHeatmap {
    pub fn get(&self, date: NaiveDate, hour: i64) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        let column = self.hours.iter().position(|h| *h == hour)?;
        self.cells[row][column]
    }

    /// Smallest and largest populated cell values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |range, &value| match range {
                None => Some((value, value)),
                Some((lo, hi)) => Some((f64::min(lo, value), f64::max(hi, value))),
            })
    }
}

/// Days between 0001-01-01 and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

pub fn w2s_heatmap(picking: &DataFrame) -> Result<W2sHeatmap> {
    let means = picking
        .clone()
        .lazy()
        .filter(col(W2S).is_not_null().and(col(TIMESTAMP).is_not_null()))
        .with_column(col(TIMESTAMP).dt().date().alias(DATE))
        .group_by([col(DATE), col(HOUR)])
        .agg([col(W2S).mean().alias(MEAN_W2S)])
        .sort([DATE, HOUR], SortMultipleOptions::default())
        .collect()?;
    if means.height() == 0 {
        return Ok(W2sHeatmap::default());
    }

    let mut hours: Vec<i64> = means.column(HOUR)?.i64()?.into_iter().flatten().collect();
    hours.sort_unstable();
    hours.dedup();

    // One row per date, one column per hour named by its value.
    let pivoted = pivot::pivot_stable(
        &means,
        [HOUR],
        Some([DATE]),
        Some([MEAN_W2S]),
        false,
        Some(col("").first()),
        None,
    )?
    .sort([DATE], SortMultipleOptions::default())?;

    let date_column = pivoted.column(DATE)?.date()?;
    let hour_columns = hours
        .iter()
        .map(|hour| Ok(pivoted.column(&hour.to_string())?.f64()?.clone()))
        .collect::<Result<Vec<Float64Chunked>>>()?;

    let mut dates = Vec::with_capacity(pivoted.height());
    let mut cells = Vec::with_capacity(pivoted.height());
    for idx in 0..pivoted.height() {
        let Some(date) = date_column.get(idx).and_then(date_from_epoch_days) else {
            continue;
        };
        dates.push(date);
        cells.push(hour_columns.iter().map(|column| column.get(idx)).collect());
    }
    debug!(dates = dates.len(), hours = hours.len(), "pivoted w2s heatmap");

    Ok(W2sHeatmap {
        dates,
        hours,
        cells,
    })
}
