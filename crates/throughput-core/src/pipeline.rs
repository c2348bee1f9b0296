//! End-to-end analysis: derive, aggregate, slice, recommend and summarise, then
//! publish the artifacts.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use crate::aggregates::{
    backlog_by_hour, backlog_values, hourly_values, hourly_w2s, late_rate_by_hour, w2s_heatmap,
    BucketValue, HourlyValue, W2sHeatmap, LATE_RATE, MEAN_W2S,
};
use crate::charts::{
    backlog_chart, heatmap_chart, late_rate_chart, w2s_chart, Chart, ChartArtifact, BACKLOG_CHART,
    HEATMAP_CHART, LATE_RATE_CHART, W2S_CHART,
};
use crate::collapse::collapse_window;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::export::{ensure_output_dir, write_recommendations, write_summary_json};
use crate::loader::Dataset;
use crate::metrics::{apply_order_metrics, apply_scenarios, apply_w2s};
use crate::recommender::predict_optimal_pickers;
use crate::render::ChartRenderer;
use crate::summary::{summarize, Summary, SummaryInputs};

/// Everything one analysis run produces, before anything is written.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Picking records with `w2s`, the scenario columns and the recommendation.
    pub picking: DataFrame,
    /// Orders with `late`, `pick_hour_only`, `backlog_hours` and `hour_start`.
    pub orders: DataFrame,
    pub hourly_w2s: Vec<HourlyValue>,
    pub late_rate: Vec<HourlyValue>,
    pub backlog: Vec<BucketValue>,
    pub heatmap: W2sHeatmap,
    /// Collapse-window slice of the enriched picking table.
    pub collapse: DataFrame,
    pub summary: Summary,
}

pub fn run_analysis(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let picking = apply_w2s(&dataset.picking, config.zero_picker_policy)?;
    let picking = apply_scenarios(&picking, &config.scenario_extra_pickers)?;
    let picking = predict_optimal_pickers(&picking, config.target_w2s)?;
    let orders = apply_order_metrics(&dataset.orders)?;
    info!(
        picking_rows = picking.height(),
        order_rows = orders.height(),
        "derived metrics"
    );

    let hourly_w2s = hourly_values(&hourly_w2s(&picking)?, MEAN_W2S)?;
    let late_rate = hourly_values(&late_rate_by_hour(&orders)?, LATE_RATE)?;
    let backlog = backlog_values(&backlog_by_hour(&orders)?)?;
    let heatmap = w2s_heatmap(&picking)?;
    info!(
        hours = hourly_w2s.len(),
        late_hours = late_rate.len(),
        backlog_buckets = backlog.len(),
        heatmap_dates = heatmap.dates.len(),
        "aggregated hourly metrics"
    );

    let collapse = collapse_window(&picking, config.collapse_window)?;

    let summary = summarize(SummaryInputs {
        staffing_rows: dataset.staffing.height(),
        picking_rows: picking.height(),
        order_rows: orders.height(),
        collapse: &collapse,
        hourly_w2s: &hourly_w2s,
        late_rate: &late_rate,
        backlog: &backlog,
    })?;
    info!(
        collapse_rows = summary.collapse_rows,
        extra_pickers = summary.collapse_extra_pickers,
        "analysis complete"
    );

    Ok(AnalysisReport {
        picking,
        orders,
        hourly_w2s,
        late_rate,
        backlog,
        heatmap,
        collapse,
        summary,
    })
}

/// Picking-only path: `w2s` plus the recommendation, sliced to the collapse window.
pub fn run_recommendation(picking: &DataFrame, config: &AnalysisConfig) -> Result<DataFrame> {
    config.validate()?;

    let picking = apply_w2s(picking, config.zero_picker_policy)?;
    let picking = predict_optimal_pickers(&picking, config.target_w2s)?;
    let collapse = collapse_window(&picking, config.collapse_window)?;
    info!(rows = collapse.height(), "computed collapse-window recommendations");
    Ok(collapse)
}

/// The four charts of a report, keyed by output file name.
pub fn chart_artifacts(report: &AnalysisReport, config: &AnalysisConfig) -> Vec<ChartArtifact> {
    let window = config.collapse_window;
    vec![
        ChartArtifact {
            file_name: W2S_CHART,
            chart: Chart::Bar(w2s_chart(&report.hourly_w2s, window)),
        },
        ChartArtifact {
            file_name: LATE_RATE_CHART,
            chart: Chart::Bar(late_rate_chart(&report.late_rate, window)),
        },
        ChartArtifact {
            file_name: BACKLOG_CHART,
            chart: Chart::Line(backlog_chart(
                &report.backlog,
                window,
                config.backlog_band_date,
            )),
        },
        ChartArtifact {
            file_name: HEATMAP_CHART,
            chart: Chart::Heatmap(heatmap_chart(&report.heatmap)),
        },
    ]
}

/// Writes charts (unless `renderer` is `None`), the recommendations CSV and the
/// JSON summary into `output_dir`. Returns the written paths in that order.
pub fn publish(
    report: &AnalysisReport,
    config: &AnalysisConfig,
    output_dir: &Path,
    renderer: Option<&dyn ChartRenderer>,
) -> Result<Vec<PathBuf>> {
    ensure_output_dir(output_dir)?;

    let mut written = Vec::new();
    if let Some(renderer) = renderer {
        for artifact in chart_artifacts(report, config) {
            let path = output_dir.join(artifact.file_name);
            renderer.render(&artifact.chart, &path)?;
            written.push(path);
        }
        info!(charts = written.len(), dir = %output_dir.display(), "rendered charts");
    }

    written.push(write_recommendations(&report.collapse, output_dir)?);
    written.push(write_summary_json(&report.summary, output_dir)?);
    Ok(written)
}
