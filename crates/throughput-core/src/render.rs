use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;
use tracing::debug;

use crate::charts::{reds, BarChart, Chart, ChartColor, HeatmapChart, LineChart};
use crate::error::{AnalysisError, Result};

/// Writes a [`Chart`] to an image file.
pub trait ChartRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<()>;
}

/// PNG output through the `plotters` bitmap backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersRenderer;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";
const LEGEND_WIDTH: u32 = 110;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<()> {
        let drawn = match chart {
            Chart::Bar(bar) => draw_bar(bar, path),
            Chart::Line(line) => draw_line(line, path),
            Chart::Heatmap(heatmap) => draw_heatmap(heatmap, path),
        };
        drawn.map_err(|err| AnalysisError::Render {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        debug!(path = %path.display(), title = chart.title(), "rendered chart");
        Ok(())
    }
}

fn rgb(color: ChartColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

/// Headroom above the tallest value; a flat or empty series still gets a unit axis.
fn y_upper(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_bar(chart: &BarChart, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let band_edges = chart.band.iter().flat_map(|band| [band.start, band.end]);
    let xs: Vec<f64> = chart
        .bars
        .iter()
        .map(|(hour, _)| *hour as f64)
        .chain(band_edges)
        .collect();
    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = if xs.is_empty() {
        (-0.6, 23.6)
    } else {
        (x_min - 0.6, x_max + 0.6)
    };
    let y_max = y_upper(chart.bars.iter().map(|(_, value)| *value));

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    let hour_label = |x: &f64| format!("{x:.0}");
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(24)
        .x_label_formatter(&hour_label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let band_style = RED.mix(0.2).filled();
    let mut legend = false;
    if let Some(band) = &chart.band {
        let series = ctx.draw_series(std::iter::once(Rectangle::new(
            [(band.start, 0.0), (band.end, y_max)],
            band_style,
        )))?;
        if let Some(label) = &band.label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], band_style));
            legend = true;
        }
    }

    let fill = rgb(chart.color).filled();
    ctx.draw_series(chart.bars.iter().map(|&(hour, value)| {
        let x = hour as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], fill)
    }))?;

    if legend {
        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn hours_between(origin: NaiveDateTime, ts: NaiveDateTime) -> f64 {
    (ts - origin).num_seconds() as f64 / 3600.0
}

fn draw_line(chart: &LineChart, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let instants: Vec<NaiveDateTime> = chart
        .points
        .iter()
        .map(|(ts, _)| *ts)
        .chain(chart.bands.iter().flat_map(|band| [band.start, band.end]))
        .collect();
    let (Some(origin), Some(last)) = (
        instants.iter().min().copied(),
        instants.iter().max().copied(),
    ) else {
        ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 24).into_font())
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)?
            .configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;
        root.present()?;
        return Ok(());
    };

    let x_max = hours_between(origin, last).max(1.0);
    let y_max = y_upper(chart.points.iter().map(|(_, value)| *value));

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    let timestamp_label = move |x: &f64| {
        (origin + Duration::seconds((x * 3600.0).round() as i64))
            .format("%m-%d %H:%M")
            .to_string()
    };
    ctx.configure_mesh()
        .x_labels(12)
        .x_label_formatter(&timestamp_label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let band_style = RED.mix(0.2).filled();
    ctx.draw_series(chart.bands.iter().map(|band| {
        Rectangle::new(
            [
                (hours_between(origin, band.start), 0.0),
                (hours_between(origin, band.end), y_max),
            ],
            band_style,
        )
    }))?;

    let color = rgb(chart.color);
    ctx.draw_series(LineSeries::new(
        chart
            .points
            .iter()
            .map(|(ts, value)| (hours_between(origin, *ts), *value)),
        color.stroke_width(2),
    ))?
    .label(chart.series_label.as_str())
    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_heatmap(chart: &HeatmapChart, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let heatmap = &chart.heatmap;
    let columns = heatmap.hours.len().max(1) as f64;
    let rows = heatmap.dates.len().max(1) as f64;
    let (lo, hi) = heatmap.value_range().unwrap_or((0.0, 1.0));
    let shade = |value: f64| {
        let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
        let (r, g, b) = reds(t);
        RGBColor(r, g, b)
    };

    let (plot_area, legend_area) =
        root.split_horizontally(chart.size.0.saturating_sub(LEGEND_WIDTH));

    let mut ctx = ChartBuilder::on(&plot_area)
        .caption(&chart.title, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(100)
        .build_cartesian_2d(0f64..columns, 0f64..rows)?;

    // Rows are drawn top-down in date order.
    let hour_label = |x: &f64| {
        heatmap
            .hours
            .get(x.floor().max(0.0) as usize)
            .map(|hour| hour.to_string())
            .unwrap_or_default()
    };
    let date_label = |y: &f64| {
        let from_top = rows - 1.0 - y.floor();
        if from_top < 0.0 {
            return String::new();
        }
        heatmap
            .dates
            .get(from_top as usize)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(heatmap.hours.len().max(1) * 2 + 1)
        .y_labels(heatmap.dates.len().max(1) * 2 + 1)
        .x_label_formatter(&hour_label)
        .y_label_formatter(&date_label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let cells = heatmap.cells.iter().enumerate().flat_map(|(row, values)| {
        let top = rows - row as f64;
        values.iter().enumerate().filter_map(move |(column, value)| {
            value.map(|value| {
                Rectangle::new(
                    [(column as f64, top - 1.0), (column as f64 + 1.0, top)],
                    shade(value).filled(),
                )
            })
        })
    });
    ctx.draw_series(cells)?;

    draw_color_scale(&legend_area, lo, hi)?;

    root.present()?;
    Ok(())
}

fn draw_color_scale(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    lo: f64,
    hi: f64,
) -> DrawResult {
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let mut scale = ChartBuilder::on(area)
        .margin_top(50)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, lo..hi)?;
    scale
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .draw()?;

    const STEPS: usize = 64;
    let step = (hi - lo) / STEPS as f64;
    scale.draw_series((0..STEPS).map(|idx| {
        let from = lo + step * idx as f64;
        let (r, g, b) = reds(idx as f64 / (STEPS - 1) as f64);
        Rectangle::new([(0.0, from), (1.0, from + step)], RGBColor(r, g, b).filled())
    }))?;
    Ok(())
}
