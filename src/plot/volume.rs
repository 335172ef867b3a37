use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::format::with_thousands;
use crate::analysis::polymarket::top_categories_by_volume;
use crate::config::{chart_sizes, Config, POLYMARKET_VOLUME_PLOT, TOP_CATEGORIES};
use crate::error::Result;
use crate::plot::{label_at, FONT, LABEL_SIZE, SERIES_BLUE, TITLE_SIZE};
use crate::types::{MarketsTable, PlotOutcome};

const MISSING_COLUMNS: &str = "Columns 'volume' or 'category' not found in Polymarket data.";

/// Horizontal bars of total volume for the busiest categories, largest on top.
pub fn plot_polymarket_volume(markets: &MarketsTable, cfg: &Config) -> Result<PlotOutcome> {
    let Some(top) = top_categories_by_volume(markets, TOP_CATEGORIES) else {
        info!("{MISSING_COLUMNS}");
        return Ok(PlotOutcome::Skipped(MISSING_COLUMNS.to_string()));
    };

    if top.is_empty() {
        let reason = "no market has a category".to_string();
        warn!("Skipping category volume chart: {reason}");
        return Ok(PlotOutcome::Skipped(reason));
    }

    let path = cfg.plot_path(POLYMARKET_VOLUME_PLOT);
    draw_category_volume(&top, &path)?;
    info!("Saved {POLYMARKET_VOLUME_PLOT}");
    Ok(PlotOutcome::Saved(path))
}

fn draw_category_volume(top: &[(String, f64)], path: &Path) -> Result<()> {
    let n = top.len();
    // bottom-up axis: the first (largest) entry sits on the highest tick
    let names: Vec<String> = top.iter().rev().map(|(name, _)| name.clone()).collect();

    let x_min = top.iter().map(|t| t.1).fold(0.0, f64::min);
    let x_max = top.iter().map(|t| t.1).fold(0.0, f64::max);
    let (x_lo, x_hi) = if x_max > x_min {
        (x_min, x_max * 1.05)
    } else {
        (0.0, 1.0)
    };

    let root = BitMapBackend::new(path, chart_sizes::CATEGORY_VOLUME).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {TOP_CATEGORIES} Polymarket Categories by Volume"),
            (FONT, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(170)
        .build_cartesian_2d(x_lo..x_hi, -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Total Volume")
        .y_desc("Category")
        .y_labels(2 * n + 1)
        .x_label_formatter(&|v: &f64| with_thousands(*v, 0))
        .y_label_formatter(&|v: &f64| label_at(&names, *v))
        .axis_desc_style((FONT, LABEL_SIZE))
        .draw()?;

    chart.draw_series(top.iter().enumerate().map(|(rank, (_, total))| {
        let y = (n - 1 - rank) as f64;
        Rectangle::new([(0.0, y - 0.4), (*total, y + 0.4)], SERIES_BLUE.filled())
    }))?;

    root.present()?;
    Ok(())
}
