mod common;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use throughput_core::charts::{Chart, BACKLOG_CHART, HEATMAP_CHART, LATE_RATE_CHART, W2S_CHART};
use throughput_core::export::{RECOMMENDATIONS_FILE, SUMMARY_FILE};
use throughput_core::loader::load_picking;
use throughput_core::pipeline::{chart_artifacts, run_recommendation};
use throughput_core::recommender::EXTRA_NEEDED;
use throughput_core::render::ChartRenderer;
use throughput_core::schema::HOUR;
use throughput_core::{
    load_dataset, publish, run_analysis, AnalysisConfig, AnalysisError, Dataset, InputPaths,
    Result, ZeroPickerPolicy,
};

use common::{ts, ORDERS_CSV, PICKING_CSV, STAFFING_CSV};

#[derive(Default)]
struct RecordingRenderer {
    rendered: RefCell<Vec<(String, PathBuf)>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<()> {
        self.rendered
            .borrow_mut()
            .push((chart.title().to_string(), path.to_path_buf()));
        Ok(())
    }
}

struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn render(&self, _chart: &Chart, path: &Path) -> Result<()> {
        Err(AnalysisError::Render {
            path: path.to_path_buf(),
            message: "no backend".to_string(),
        })
    }
}

fn write_inputs(dir: &Path) -> InputPaths {
    let paths = InputPaths::in_dir(dir);
    fs::write(&paths.staffing, STAFFING_CSV).unwrap();
    fs::write(&paths.picking, PICKING_CSV).unwrap();
    fs::write(&paths.orders, ORDERS_CSV).unwrap();
    paths
}

fn dataset() -> (tempfile::TempDir, Dataset) {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path());
    let dataset = load_dataset(&paths).unwrap();
    (dir, dataset)
}

#[test]
fn analysis_reports_peaks_and_collapse_recommendations() {
    let (_dir, dataset) = dataset();
    let report = run_analysis(&dataset, &AnalysisConfig::default()).unwrap();

    let summary = &report.summary;
    assert_eq!(summary.staffing_rows, 3);
    assert_eq!(summary.picking_rows, 6);
    assert_eq!(summary.order_rows, 3);

    let peak = summary.peak_w2s.unwrap();
    assert_eq!((peak.hour, peak.value), (2, 450.0));
    let late = summary.peak_late_rate.unwrap();
    assert_eq!((late.hour, late.value), (2, 0.5));
    let backlog = summary.peak_backlog.unwrap();
    assert_eq!(backlog.hour_start, ts("2025-01-01 02:00:00"));
    assert!((backlog.value - 1.25).abs() < 1e-12);

    // The zero-picker row at 05:00 has no ratio and no hourly mean.
    assert!(report.hourly_w2s.iter().all(|row| row.hour != 5));

    let hours: Vec<i64> = report
        .collapse
        .column(HOUR)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(hours, vec![1, 2, 3]);
    assert_eq!(summary.collapse_rows, 3);
    assert_eq!(summary.collapse_extra_pickers, 2);

    let extra = report.collapse.column(EXTRA_NEEDED).unwrap().i64().unwrap();
    assert_eq!(extra.into_iter().flatten().collect::<Vec<_>>(), vec![0, 1, 1]);
}

#[test]
fn rejecting_zero_pickers_fails_the_run() {
    let (_dir, dataset) = dataset();
    let config = AnalysisConfig {
        zero_picker_policy: ZeroPickerPolicy::Reject,
        ..AnalysisConfig::default()
    };
    let err = run_analysis(&dataset, &config).unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
}

#[test]
fn invalid_config_is_rejected_before_any_work() {
    let (_dir, dataset) = dataset();
    let config = AnalysisConfig {
        target_w2s: -1.0,
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        run_analysis(&dataset, &config),
        Err(AnalysisError::Config(_))
    ));
}

#[test]
fn publish_writes_charts_csv_and_summary() {
    let (dir, dataset) = dataset();
    let config = AnalysisConfig::default();
    let report = run_analysis(&dataset, &config).unwrap();
    let output_dir = dir.path().join("outputs");
    let renderer = RecordingRenderer::default();

    let written = publish(&report, &config, &output_dir, Some(&renderer)).unwrap();

    let expected: Vec<PathBuf> = [
        W2S_CHART,
        LATE_RATE_CHART,
        BACKLOG_CHART,
        HEATMAP_CHART,
        RECOMMENDATIONS_FILE,
        SUMMARY_FILE,
    ]
    .iter()
    .map(|name| output_dir.join(name))
    .collect();
    assert_eq!(written, expected);

    let rendered = renderer.rendered.borrow();
    assert_eq!(rendered.len(), 4);
    assert_eq!(rendered[0].0, "Average W2S per Hour");
    assert_eq!(rendered[3].0, "W2S Heatmap by Day and Hour");

    let csv = fs::read_to_string(output_dir.join(RECOMMENDATIONS_FILE)).unwrap();
    let timestamps: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(
        timestamps,
        vec![
            "2025-01-01 01:00:00",
            "2025-01-01 02:00:00",
            "2025-01-01 03:00:00"
        ]
    );
    assert!(output_dir.join(SUMMARY_FILE).is_file());
}

#[test]
fn publish_without_renderer_skips_charts() {
    let (dir, dataset) = dataset();
    let config = AnalysisConfig::default();
    let report = run_analysis(&dataset, &config).unwrap();

    let written = publish(&report, &config, dir.path(), None).unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join(RECOMMENDATIONS_FILE),
            dir.path().join(SUMMARY_FILE)
        ]
    );
    assert!(!dir.path().join(W2S_CHART).exists());
}

#[test]
fn renderer_errors_propagate() {
    let (dir, dataset) = dataset();
    let config = AnalysisConfig::default();
    let report = run_analysis(&dataset, &config).unwrap();

    let err = publish(&report, &config, dir.path(), Some(&FailingRenderer)).unwrap_err();
    assert!(matches!(err, AnalysisError::Render { .. }));
}

#[test]
fn chart_set_follows_report() {
    let (_dir, dataset) = dataset();
    let config = AnalysisConfig::default();
    let report = run_analysis(&dataset, &config).unwrap();

    let artifacts = chart_artifacts(&report, &config);
    let names: Vec<&str> = artifacts.iter().map(|artifact| artifact.file_name).collect();
    assert_eq!(
        names,
        vec![W2S_CHART, LATE_RATE_CHART, BACKLOG_CHART, HEATMAP_CHART]
    );
    match &artifacts[2].chart {
        Chart::Line(line) => {
            assert_eq!(line.points.len(), 2);
            assert_eq!(line.bands.len(), 1);
        }
        other => panic!("expected a line chart, got {other:?}"),
    }
}

#[test]
fn missing_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = InputPaths::in_dir(dir.path());
    fs::write(&paths.staffing, STAFFING_CSV).unwrap();

    match load_dataset(&paths) {
        Err(AnalysisError::Load { path, .. }) => assert_eq!(path, paths.picking),
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn recommendation_path_uses_picking_only() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path());
    let picking = load_picking(&paths.picking).unwrap();

    let collapse = run_recommendation(&picking, &AnalysisConfig::default()).unwrap();
    assert_eq!(collapse.height(), 3);
    let extra = collapse.column(EXTRA_NEEDED).unwrap().i64().unwrap();
    assert_eq!(extra.into_iter().flatten().sum::<i64>(), 2);
}
