//! Renders a daily max-temperature series into an embeddable chart.
//!
//! The chart is drawn as an SVG document in memory; the base64 form is what
//! a web collaborator inlines into an `<img>` tag.

use crate::error::RaincheckError;
use crate::types::daily_series::DailySeries;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (1300, 600);

/// Draws the series as an SVG line chart. Days without a value are skipped;
/// an entirely valueless series renders to an empty string.
pub fn render_svg(city: &str, series: &DailySeries) -> Result<String, RaincheckError> {
    let points: Vec<(NaiveDate, f64)> = series
        .iter()
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect();
    if points.is_empty() {
        return Ok(String::new());
    }

    let mut svg = String::new();
    draw(&mut svg, city, &points).map_err(|e| RaincheckError::ChartRender(e.to_string()))?;
    Ok(svg)
}

/// Base64 of the SVG document, for embedding. Empty when there is nothing
/// to plot.
pub fn render_base64(city: &str, series: &DailySeries) -> Result<String, RaincheckError> {
    let svg = render_svg(city, series)?;
    if svg.is_empty() {
        return Ok(String::new());
    }
    Ok(STANDARD.encode(svg.as_bytes()))
}

fn draw(
    svg: &mut String,
    city: &str,
    points: &[(NaiveDate, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let first_date = points[0].0;
    let last_date = points[points.len() - 1].0;
    // Degenerate single-day ranges still need a non-empty axis.
    let x_end = if last_date > first_date {
        last_date
    } else {
        first_date + Duration::days(1)
    };

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, v) in points {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }
    let y_pad = ((y_max - y_min) * 0.1).max(1.0);

    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Daily max temperatures in {}", city),
            ("sans-serif", 40),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(first_date..x_end, (y_min - y_pad)..(y_max + y_pad))?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
        .y_desc("Max temperature (°C)")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|(d, v)| Circle::new((*d, *v), 3, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}
