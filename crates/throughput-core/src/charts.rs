//! Renderer-independent chart descriptions.
//!
//! Builders here only shape data; drawing happens behind [`crate::render::ChartRenderer`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::aggregates::{BucketValue, HourlyValue, W2sHeatmap};
use crate::config::HourWindow;

pub const W2S_CHART: &str = "w2s_per_hour.png";
pub const LATE_RATE_CHART: &str = "late_pick_rate.png";
pub const BACKLOG_CHART: &str = "backlog_per_hour.png";
pub const HEATMAP_CHART: &str = "w2s_heatmap.png";

const BAR_SIZE: (u32, u32) = (1000, 500);
const LINE_SIZE: (u32, u32) = (1200, 500);
const HEATMAP_SIZE: (u32, u32) = (1500, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartColor {
    SkyBlue,
    Orange,
    Purple,
}

impl ChartColor {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ChartColor::SkyBlue => (135, 206, 235),
            ChartColor::Orange => (255, 165, 0),
            ChartColor::Purple => (128, 0, 128),
        }
    }
}

/// Shaded x range on an hour-of-day axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub start: f64,
    pub end: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(i64, f64)>,
    pub color: ChartColor,
    pub band: Option<Band>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBand {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series_label: String,
    pub points: Vec<(NaiveDateTime, f64)>,
    pub color: ChartColor,
    pub bands: Vec<TimeBand>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub heatmap: W2sHeatmap,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Bar(BarChart),
    Line(LineChart),
    Heatmap(HeatmapChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar(chart) => &chart.title,
            Chart::Line(chart) => &chart.title,
            Chart::Heatmap(chart) => &chart.title,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Chart::Bar(chart) => chart.size,
            Chart::Line(chart) => chart.size,
            Chart::Heatmap(chart) => chart.size,
        }
    }
}

/// A chart together with the file name it is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub file_name: &'static str,
    pub chart: Chart,
}

fn window_band(window: HourWindow, label: Option<String>) -> Band {
    Band {
        start: window.start as f64,
        end: window.end as f64,
        label,
    }
}

fn bars(rows: &[HourlyValue]) -> Vec<(i64, f64)> {
    rows.iter()
        .filter_map(|row| row.value.map(|value| (row.hour, value)))
        .collect()
}

pub fn w2s_chart(hourly: &[HourlyValue], window: HourWindow) -> BarChart {
    BarChart {
        title: "Average W2S per Hour".to_string(),
        x_label: "Hour of Day".to_string(),
        y_label: "Units per Picker".to_string(),
        bars: bars(hourly),
        color: ChartColor::SkyBlue,
        band: Some(window_band(
            window,
            Some(format!(
                "Collapse Hours ({}-{} AM)",
                window.start, window.end
            )),
        )),
        size: BAR_SIZE,
    }
}

pub fn late_rate_chart(late_rate: &[HourlyValue], window: HourWindow) -> BarChart {
    BarChart {
        title: "Late-pick Rate by Hour".to_string(),
        x_label: "Hour of Day".to_string(),
        y_label: "Fraction of Orders Late".to_string(),
        bars: bars(late_rate),
        color: ChartColor::Orange,
        band: Some(window_band(window, None)),
        size: BAR_SIZE,
    }
}

/// Collapse-window bands for the backlog chart: one on `pinned` when given,
/// otherwise one on every calendar date the points span.
pub fn backlog_bands(
    points: &[(NaiveDateTime, f64)],
    window: HourWindow,
    pinned: Option<NaiveDate>,
) -> Vec<TimeBand> {
    let band_on = |date: NaiveDate| {
        let midnight = date.and_time(NaiveTime::MIN);
        TimeBand {
            start: midnight + Duration::hours(window.start),
            end: midnight + Duration::hours(window.end),
        }
    };

    if let Some(date) = pinned {
        return vec![band_on(date)];
    }

    let (Some(first), Some(last)) = (
        points.iter().map(|(ts, _)| ts.date()).min(),
        points.iter().map(|(ts, _)| ts.date()).max(),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(band_on)
        .collect()
}

pub fn backlog_chart(
    backlog: &[BucketValue],
    window: HourWindow,
    pinned: Option<NaiveDate>,
) -> LineChart {
    let points: Vec<(NaiveDateTime, f64)> = backlog
        .iter()
        .filter_map(|row| row.value.map(|value| (row.hour_start, value)))
        .collect();
    let bands = backlog_bands(&points, window, pinned);

    LineChart {
        title: "Hourly Backlog (Hours)".to_string(),
        x_label: "Timestamp".to_string(),
        y_label: "Avg Backlog (Hours)".to_string(),
        series_label: "Avg backlog (hours)".to_string(),
        points,
        color: ChartColor::Purple,
        bands,
        size: LINE_SIZE,
    }
}

pub fn heatmap_chart(heatmap: &W2sHeatmap) -> HeatmapChart {
    HeatmapChart {
        title: "W2S Heatmap by Day and Hour".to_string(),
        x_label: "Hour of Day".to_string(),
        y_label: "Date".to_string(),
        heatmap: heatmap.clone(),
        size: HEATMAP_SIZE,
    }
}

/// Linear white-to-dark-red ramp for heatmap cells. `t` is clamped to `[0, 1]`.
pub fn reds(t: f64) -> (u8, u8, u8) {
    const LOW: (f64, f64, f64) = (255.0, 245.0, 240.0);
    const HIGH: (f64, f64, f64) = (103.0, 0.0, 13.0);

    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let mix = |lo: f64, hi: f64| (lo + (hi - lo) * t).round() as u8;
    (mix(LOW.0, HIGH.0), mix(LOW.1, HIGH.1), mix(LOW.2, HIGH.2))
}
