//! SVG line charts of a rate series.

use crate::core::pipeline::{ChartSeries, PointIndexing};
use anyhow::{Result, anyhow};
use chrono::DateTime;
use plotters::prelude::*;
use std::path::Path;

/// Formats an x value for display. Timestamps use `pattern`, ordinals print as integers.
pub fn format_x(x: f64, indexing: PointIndexing, pattern: &str) -> String {
    match indexing {
        PointIndexing::Timestamp => DateTime::from_timestamp(x as i64, 0)
            .map(|dt| dt.format(pattern).to_string())
            .unwrap_or_else(|| format!("{x}")),
        PointIndexing::Ordinal => format!("{}", x as i64),
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Position of an x value on the chart axis. Timestamps are plotted in days so
/// whole days land on whole axis units.
fn axis_position(x: f64, indexing: PointIndexing) -> f64 {
    match indexing {
        PointIndexing::Timestamp => x / SECONDS_PER_DAY,
        PointIndexing::Ordinal => x,
    }
}

/// Tick label for an axis position. Only whole days and whole indexes are labelled.
fn axis_label(position: f64, indexing: PointIndexing) -> String {
    let whole = position.round();
    if (position - whole).abs() > 1e-6 {
        return String::new();
    }
    match indexing {
        PointIndexing::Timestamp => format_x(whole * SECONDS_PER_DAY, indexing, "%d/%m"),
        PointIndexing::Ordinal => format_x(whole, indexing, ""),
    }
}

/// Pads a value range so a flat or single-point series still has a visible extent.
fn padded_range(min: f64, max: f64, ratio: f64, floor: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let padding = if span > 0.0 { span * ratio } else { floor };
    (min - padding, max + padding)
}

/// Draws `series` as a line chart into an SVG file at `path`.
pub fn draw_line_chart(series: &ChartSeries, path: &Path, width: u32, height: u32) -> Result<()> {
    if series.points.is_empty() {
        return Err(anyhow!("Cannot draw an empty series: {}", series.label));
    }

    let indexing = series.indexing;
    let coords: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|p| (axis_position(p.x, indexing), p.y))
        .collect();

    let (x_min, x_max) = coords
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
            (lo.min(x), hi.max(x))
        });
    let (y_min, y_max) = coords
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    let (x_min, x_max) = padded_range(x_min, x_max, 0.05, 1.0);
    let (y_min, y_max) = padded_range(y_min, y_max, 0.1, 1e-3);

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("Failed to fill canvas: {}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&series.label, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

    let x_formatter = |x: &f64| axis_label(*x, indexing);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(match indexing {
            PointIndexing::Timestamp => "Date",
            PointIndexing::Ordinal => "Index",
        })
        .y_desc(&series.label)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|y| format!("{y:.3}"))
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {}", e))?;

    chart
        .draw_series(LineSeries::new(coords.iter().copied(), BLUE.stroke_width(2)))
        .map_err(|e| anyhow!("Failed to draw line: {}", e))?
        .label(&series.label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(
            coords
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, RED.filled())),
        )
        .map_err(|e| anyhow!("Failed to draw points: {}", e))?;

    chart
        .draw_series(coords.iter().map(|&(x, y)| {
            Text::new(format!("{y:.3}"), (x, y), ("sans-serif", 14.0).into_font())
        }))
        .map_err(|e| anyhow!("Failed to draw values: {}", e))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;

    root.present()
        .map_err(|e| anyhow!("Failed to write chart to {}: {}", path.display(), e))?;
    Ok(())
}
