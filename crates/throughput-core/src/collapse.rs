use polars::prelude::*;
use tracing::debug;

use crate::config::HourWindow;
use crate::error::Result;
use crate::metrics::{scenario_column, W2S};
use crate::recommender::{EXTRA_NEEDED, OPTIMAL_PICKERS};
use crate::schema::{ACTIVE_PICKERS, HOUR, TIMESTAMP, UNITS_PICKED};

/// Columns of the raw collapse-window snapshot.
pub const RAW_SNAPSHOT_COLUMNS: &[&str] = &[TIMESTAMP, ACTIVE_PICKERS, UNITS_PICKED, W2S];

/// Columns of the recommendation snapshot and of the exported CSV.
pub const RECOMMENDATION_COLUMNS: &[&str] = &[
    TIMESTAMP,
    ACTIVE_PICKERS,
    UNITS_PICKED,
    W2S,
    OPTIMAL_PICKERS,
    EXTRA_NEEDED,
];

/// Picking rows whose `hour` lies inside `window` (both bounds inclusive).
pub fn collapse_window(picking: &DataFrame, window: HourWindow) -> Result<DataFrame> {
    let df = picking
        .clone()
        .lazy()
        .filter(
            col(HOUR)
                .gt_eq(lit(window.start))
                .and(col(HOUR).lt_eq(lit(window.end))),
        )
        .collect()?;
    debug!(
        rows = df.height(),
        start = window.start,
        end = window.end,
        "sliced collapse window"
    );
    Ok(df)
}

/// `timestamp`, `w2s` and one column per staffing scenario.
pub fn scenario_snapshot_columns(extras: &[u32]) -> Vec<String> {
    let mut columns = vec![TIMESTAMP.to_string(), W2S.to_string()];
    columns.extend(extras.iter().map(|extra| scenario_column(*extra)));
    columns
}

/// The first `rows` rows of `columns`, for console display.
pub fn snapshot<S: AsRef<str>>(df: &DataFrame, columns: &[S], rows: usize) -> Result<DataFrame> {
    let selected = df.select(columns.iter().map(|name| name.as_ref()))?;
    Ok(selected.head(Some(rows)))
}
