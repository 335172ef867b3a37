use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::analysis::stats::CorrelationMatrix;
use crate::config::chart_sizes;
use crate::error::Result;
use crate::plot::{interpolate_color, label_at, FONT, LABEL_SIZE, TITLE_SIZE};
use crate::types::PlotOutcome;

const COOL: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);
const UNDEFINED: RGBColor = RGBColor(245, 245, 245);

/// Width of the heatmap panel; the rest of the canvas holds the color bar.
const MATRIX_PANEL_WIDTH: i32 = 680;
const COLORBAR_STEPS: usize = 100;

/// Diverging blue → grey → red scale over [-1, 1].
pub fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return UNDEFINED;
    }
    let v = value.clamp(-1.0, 1.0);
    if v < 0.0 {
        interpolate_color(NEUTRAL, COOL, -v)
    } else {
        interpolate_color(NEUTRAL, WARM, v)
    }
}

/// Annotated correlation heatmap with the first label in the top row.
pub fn plot_correlation_heatmap(matrix: &CorrelationMatrix, title: &str, path: &Path) -> Result<PlotOutcome> {
    if matrix.labels.is_empty() {
        return Ok(PlotOutcome::Skipped("empty correlation matrix".to_string()));
    }

    draw_heatmap(matrix, title, path)?;
    let name = path.file_name().unwrap_or(path.as_os_str());
    info!("Saved {}", name.to_string_lossy());
    Ok(PlotOutcome::Saved(path.to_path_buf()))
}

fn draw_heatmap(matrix: &CorrelationMatrix, title: &str, path: &Path) -> Result<()> {
    let n = matrix.labels.len();
    let extent = n as f64 - 0.5;
    let x_names = matrix.labels.clone();
    let y_names: Vec<String> = matrix.labels.iter().rev().cloned().collect();

    let root = BitMapBackend::new(path, chart_sizes::CORRELATION).into_drawing_area();
    root.fill(&WHITE)?;
    let (matrix_area, bar_area) = root.split_horizontally(MATRIX_PANEL_WIDTH);

    let mut chart = ChartBuilder::on(&matrix_area)
        .caption(title, (FONT, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(120)
        .build_cartesian_2d(-0.5..extent, -0.5..extent)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(2 * n + 1)
        .y_labels(2 * n + 1)
        .x_label_formatter(&|v: &f64| label_at(&x_names, *v))
        .y_label_formatter(&|v: &f64| label_at(&y_names, *v))
        .label_style((FONT, LABEL_SIZE - 2))
        .draw()?;

    let cells = heatmap_cells(matrix);

    chart.draw_series(cells.iter().map(|&(x, y, value)| {
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], coolwarm(value).filled())
    }))?;

    chart.draw_series(cells.iter().map(|&(x, y, value)| {
        let style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&annotation_color(value))
            .pos(Pos::new(HPos::Center, VPos::Center));
        Text::new(annotation(value), (x, y), style)
    }))?;

    draw_colorbar(&bar_area)?;
    root.present()?;
    Ok(())
}

fn draw_colorbar(area: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
    let mut bar = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(55)
        .margin_left(10)
        .margin_right(10)
        .right_y_label_area_size(45)
        .build_cartesian_2d(0.0..1.0, -1.0..1.0)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v: &f64| format!("{v:.1}"))
        .draw()?;

    let step = 2.0 / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let lo = -1.0 + i as f64 * step;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], coolwarm(lo + step / 2.0).filled())
    }))?;
    Ok(())
}

/// `(x, y, value)` per cell, with matrix row 0 on the top row of the chart.
fn heatmap_cells(matrix: &CorrelationMatrix) -> Vec<(f64, f64, f64)> {
    let n = matrix.labels.len();
    (0..n)
        .flat_map(|row| (0..n).map(move |col| (row, col)))
        .map(|(row, col)| (col as f64, (n - 1 - row) as f64, matrix.get(row, col)))
        .collect()
}

fn annotation(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn annotation_color(value: f64) -> RGBColor {
    if value.abs() > 0.6 {
        WHITE
    } else {
        BLACK
    }
}
