use chrono::Timelike;
use polars::prelude::*;
use throughput_parser::naive_from_micros;
use tracing::{debug, warn};

use crate::config::ZeroPickerPolicy;
use crate::error::{AnalysisError, Result};
use crate::schema::{ACTIVE_PICKERS, ACTUAL_DEPARTURE, PICK_START, SLA_CUTOFF, UNITS_PICKED};

pub const W2S: &str = "w2s";
pub const LATE: &str = "late";
pub const PICK_HOUR_ONLY: &str = "pick_hour_only";
pub const BACKLOG_HOURS: &str = "backlog_hours";
pub const HOUR_START: &str = "hour_start";

pub(crate) const MICROS_PER_HOUR: i64 = 3_600_000_000;

/// Name of the counterfactual ratio column for `extra` phantom pickers.
pub fn scenario_column(extra: u32) -> String {
    format!("w2s_plus_{extra}")
}

/// Adds `w2s = units_picked / active_pickers`.
///
/// Rows without a positive picker count get a null ratio, or fail the call under
/// [`ZeroPickerPolicy::Reject`].
pub fn apply_w2s(picking: &DataFrame, policy: ZeroPickerPolicy) -> Result<DataFrame> {
    let units = picking.column(UNITS_PICKED)?.i64()?;
    let pickers = picking.column(ACTIVE_PICKERS)?.i64()?;

    let mut w2s: Vec<Option<f64>> = Vec::with_capacity(picking.height());
    let mut unstaffed = 0usize;

    for idx in 0..picking.height() {
        let ratio = match (units.get(idx), pickers.get(idx)) {
            (Some(units), Some(pickers)) if pickers > 0 => Some(units as f64 / pickers as f64),
            (Some(_), Some(_)) => {
                unstaffed += 1;
                None
            }
            _ => None,
        };
        w2s.push(ratio);
    }

    if unstaffed > 0 {
        match policy {
            ZeroPickerPolicy::Reject => {
                return Err(AnalysisError::Validation(format!(
                    "{unstaffed} picking rows report no active pickers"
                )));
            }
            ZeroPickerPolicy::Exclude => {
                warn!(
                    rows = unstaffed,
                    "picking rows without active pickers excluded from w2s aggregates"
                );
            }
        }
    }

    let mut output = picking.clone();
    output.with_column(Series::new(W2S.into(), w2s))?;
    Ok(output)
}

/// Adds one `w2s_plus_k` column per entry of `extras`:
/// `units_picked / (active_pickers + k)`.
pub fn apply_scenarios(picking: &DataFrame, extras: &[u32]) -> Result<DataFrame> {
    let units = picking.column(UNITS_PICKED)?.i64()?;
    let pickers = picking.column(ACTIVE_PICKERS)?.i64()?;

    let mut output = picking.clone();
    for &extra in extras {
        let values: Vec<Option<f64>> = units
            .into_iter()
            .zip(pickers.into_iter())
            .map(|(units, pickers)| match (units, pickers) {
                (Some(units), Some(pickers)) if pickers + i64::from(extra) > 0 => {
                    Some(units as f64 / (pickers + i64::from(extra)) as f64)
                }
                _ => None,
            })
            .collect();
        output.with_column(Series::new(scenario_column(extra).into(), values))?;
    }

    debug!(scenarios = extras.len(), "derived counterfactual staffing ratios");
    Ok(output)
}

/// Adds the per-order lifecycle metrics:
/// `late` (departure strictly after the SLA cutoff), `pick_hour_only`,
/// `backlog_hours` and `hour_start` (pick start floored to the hour).
pub fn apply_order_metrics(orders: &DataFrame) -> Result<DataFrame> {
    let len = orders.height();

    let pick_start = orders.column(PICK_START)?.datetime()?;
    let sla_cutoff = orders.column(SLA_CUTOFF)?.datetime()?;
    let departure = orders.column(ACTUAL_DEPARTURE)?.datetime()?;

    let mut late: Vec<Option<bool>> = Vec::with_capacity(len);
    let mut pick_hour: Vec<Option<i64>> = Vec::with_capacity(len);
    let mut backlog: Vec<Option<f64>> = Vec::with_capacity(len);
    let mut hour_start: Vec<Option<i64>> = Vec::with_capacity(len);

    for idx in 0..len {
        let start = pick_start.get(idx);
        let departed = departure.get(idx);

        late.push(match (departed, sla_cutoff.get(idx)) {
            (Some(departed), Some(cutoff)) => Some(departed > cutoff),
            _ => None,
        });

        pick_hour.push(
            start
                .and_then(naive_from_micros)
                .map(|dt| i64::from(dt.hour())),
        );

        backlog.push(match (start, departed) {
            (Some(start), Some(departed)) => {
                Some((departed - start) as f64 / MICROS_PER_HOUR as f64)
            }
            _ => None,
        });

        hour_start.push(start.map(|value| value.div_euclid(MICROS_PER_HOUR) * MICROS_PER_HOUR));
    }

    let hour_start = Series::new(HOUR_START.into(), hour_start)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let mut output = orders.clone();
    output.with_column(Series::new(LATE.into(), late))?;
    output.with_column(Series::new(PICK_HOUR_ONLY.into(), pick_hour))?;
    output.with_column(Series::new(BACKLOG_HOURS.into(), backlog))?;
    output.with_column(hour_start)?;

    Ok(output)
}
