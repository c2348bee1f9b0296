use polars::prelude::*;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::schema::{ACTIVE_PICKERS, UNITS_PICKED};

pub const OPTIMAL_PICKERS: &str = "optimal_pickers";
pub const EXTRA_NEEDED: &str = "extra_needed";

/// Adds `optimal_pickers = ceil(units_picked / target_w2s)` and
/// `extra_needed = max(0, optimal_pickers - active_pickers)`.
///
/// Existing recommendation columns are replaced, so running this on its own output
/// yields the same values.
pub fn predict_optimal_pickers(df: &DataFrame, target_w2s: f64) -> Result<DataFrame> {
    if !target_w2s.is_finite() || target_w2s <= 0.0 {
        return Err(AnalysisError::Config(format!(
            "target_w2s must be a positive number, got {target_w2s}"
        )));
    }

    let units = df.column(UNITS_PICKED)?.i64()?;
    let pickers = df.column(ACTIVE_PICKERS)?.i64()?;

    let mut optimal: Vec<Option<i64>> = Vec::with_capacity(df.height());
    let mut extra: Vec<Option<i64>> = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let needed = units
            .get(idx)
            .map(|units| optimal_pickers(units, target_w2s));
        optimal.push(needed);
        extra.push(match (needed, pickers.get(idx)) {
            (Some(needed), Some(active)) => Some(extra_needed(needed, active)),
            _ => None,
        });
    }

    let mut output = df.clone();
    output.with_column(Series::new(OPTIMAL_PICKERS.into(), optimal))?;
    output.with_column(Series::new(EXTRA_NEEDED.into(), extra))?;

    debug!(rows = output.height(), target_w2s, "computed staffing recommendations");
    Ok(output)
}

pub fn optimal_pickers(units_picked: i64, target_w2s: f64) -> i64 {
    (units_picked as f64 / target_w2s).ceil() as i64
}

pub fn extra_needed(optimal_pickers: i64, active_pickers: i64) -> i64 {
    (optimal_pickers - active_pickers).max(0)
}
