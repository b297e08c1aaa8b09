use super::{plot, ui};
use crate::core::config::AppConfig;
use crate::core::{
    CurrencyCode, DateRange, FetchError, FetchOutcome, PointIndexing, RateQueryPipeline, RateSource,
};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One user-triggered fetch-render cycle.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub currency: CurrencyCode,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub indexing: PointIndexing,
    pub output: PathBuf,
}

impl ChartRequest {
    /// Default chart file name, e.g. `USD_MXN.svg`.
    pub fn default_output(currency: &CurrencyCode, base_currency: &str) -> PathBuf {
        PathBuf::from(format!("{currency}_{base_currency}.svg"))
    }
}

/// Runs the cycle and renders the outcome. Only I/O failures while drawing
/// are returned as errors; query problems are reported and returned as an outcome.
pub async fn run(
    request: &ChartRequest,
    source: &dyn RateSource,
    config: &AppConfig,
) -> Result<FetchOutcome> {
    let range = match DateRange::from_bounds(request.start, request.end) {
        Ok(range) => range,
        Err(e) => {
            debug!("Rejected range before querying: {e}");
            println!(
                "{}",
                ui::style_text("Invalid date range", ui::StyleType::Error)
            );
            return Ok(FetchOutcome::Failed(e));
        }
    };

    let pipeline = RateQueryPipeline::new(source, request.indexing, &config.base_currency);
    let label = pipeline.label(&request.currency);
    info!(
        %label,
        start = range.start(),
        end = range.end(),
        indexing = %pipeline.indexing(),
        "Fetching rates"
    );

    let pb = ui::new_spinner(&format!("Fetching {label} rates"));
    let outcome = pipeline.fetch(&request.currency, &range).await;
    pb.finish_and_clear();

    render(&outcome, &label, &range, request, config)?;
    Ok(outcome)
}

fn render(
    outcome: &FetchOutcome,
    label: &str,
    range: &DateRange,
    request: &ChartRequest,
    config: &AppConfig,
) -> Result<()> {
    match outcome {
        FetchOutcome::Populated(series) => {
            println!(
                "\nExchange rate: {}",
                ui::style_text(&series.label, ui::StyleType::Title)
            );
            if series.indexing != request.indexing {
                println!(
                    "{}",
                    ui::style_text(
                        "Source returned no dates, points are indexed by position",
                        ui::StyleType::Subtle
                    )
                );
            }

            let axis_header = match series.indexing {
                PointIndexing::Timestamp => "Date",
                PointIndexing::Ordinal => "Index",
            };
            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell(axis_header), ui::header_cell("Rate")]);
            for point in &series.points {
                table.add_row(vec![
                    Cell::new(plot::format_x(point.x, series.indexing, "%d/%m/%Y")),
                    ui::rate_cell(point.y),
                ]);
            }
            println!("{table}");

            plot::draw_line_chart(
                series,
                &request.output,
                config.chart.width,
                config.chart.height,
            )?;
            println!(
                "{} {}",
                ui::style_text("Chart written to", ui::StyleType::Success),
                request.output.display()
            );
        }
        FetchOutcome::Empty => {
            clear_chart(&request.output)?;
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "No data found for {} between {} and {}",
                        label,
                        plot::format_x(range.start() as f64, PointIndexing::Timestamp, "%d/%m/%Y"),
                        plot::format_x(range.end() as f64, PointIndexing::Timestamp, "%d/%m/%Y"),
                    ),
                    ui::StyleType::Warning
                )
            );
        }
        FetchOutcome::Failed(e) => {
            let notice = match e {
                FetchError::InvalidRange { .. } => "Invalid date range".to_string(),
                FetchError::QueryFailure(reason) => {
                    format!("Error querying exchange rates for {label}: {reason}")
                }
            };
            println!("{}", ui::style_text(&notice, ui::StyleType::Error));
        }
    }
    Ok(())
}

/// Whether `path` holds an SVG document, the only kind of file this tool draws.
fn is_svg_chart(path: &Path) -> bool {
    let has_svg_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    has_svg_extension
        && std::fs::read_to_string(path).is_ok_and(|content| {
            let content = content.trim_start();
            content.starts_with("<svg") || content.starts_with("<?xml")
        })
}

/// Removes a chart left by an earlier cycle so an empty result shows no chart.
/// Anything at `path` that is not an SVG chart is left alone.
fn clear_chart(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if !is_svg_chart(path) {
        warn!("Not clearing {}, it is not an SVG chart", path.display());
        return Ok(());
    }

    std::fs::remove_file(path)
        .with_context(|| format!("Failed to clear chart at {}", path.display()))?;
    debug!("Cleared previous chart at {}", path.display());
    Ok(())
}
