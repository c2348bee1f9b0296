use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use serde::Serialize;
use throughput_parser::naive_from_micros;
use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::metrics::W2S;
use crate::recommender::{EXTRA_NEEDED, OPTIMAL_PICKERS};
use crate::schema::{ACTIVE_PICKERS, TIMESTAMP, UNITS_PICKED};
use crate::summary::Summary;

pub const RECOMMENDATIONS_FILE: &str = "collapse_hours_optimal_pickers.csv";
pub const SUMMARY_FILE: &str = "summary.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Creates `dir` (and its parents) if needed. Existing directories are left alone.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// One exported row of the collapse-window recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub timestamp: String,
    pub active_pickers: Option<i64>,
    pub units_picked: Option<i64>,
    pub w2s: Option<f64>,
    pub optimal_pickers: Option<i64>,
    pub extra_needed: Option<i64>,
}

pub fn recommendation_rows(collapse: &DataFrame) -> Result<Vec<RecommendationRow>> {
    let timestamps = collapse.column(TIMESTAMP)?.datetime()?;
    let pickers = collapse.column(ACTIVE_PICKERS)?.i64()?;
    let units = collapse.column(UNITS_PICKED)?.i64()?;
    let w2s = collapse.column(W2S)?.f64()?;
    let optimal = collapse.column(OPTIMAL_PICKERS)?.i64()?;
    let extra = collapse.column(EXTRA_NEEDED)?.i64()?;

    let mut rows = Vec::with_capacity(collapse.height());
    for idx in 0..collapse.height() {
        let timestamp = match timestamps.get(idx) {
            Some(micros) => naive_from_micros(micros)
                .ok_or_else(|| {
                    AnalysisError::Validation(format!("timestamp {micros} is out of range"))
                })?
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            None => String::new(),
        };
        rows.push(RecommendationRow {
            timestamp,
            active_pickers: pickers.get(idx),
            units_picked: units.get(idx),
            w2s: w2s.get(idx),
            optimal_pickers: optimal.get(idx),
            extra_needed: extra.get(idx),
        });
    }
    Ok(rows)
}

/// Writes the collapse-window recommendations CSV into `output_dir`, replacing any
/// previous file.
pub fn write_recommendations(collapse: &DataFrame, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(RECOMMENDATIONS_FILE);
    let rows = recommendation_rows(collapse)?;

    let mut writer = csv::Writer::from_path(&path)?;
    if rows.is_empty() {
        writer.write_record([
            TIMESTAMP,
            ACTIVE_PICKERS,
            UNITS_PICKED,
            W2S,
            OPTIMAL_PICKERS,
            EXTRA_NEEDED,
        ])?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(rows = rows.len(), path = %path.display(), "wrote staffing recommendations");
    Ok(path)
}

pub fn write_summary_json(summary: &Summary, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(SUMMARY_FILE);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, summary)?;
    info!(path = %path.display(), "wrote run summary");
    Ok(path)
}
