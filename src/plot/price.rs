use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::format::with_thousands;
use crate::config::{chart_sizes, Config, BTC_PRICE_PLOT};
use crate::error::Result;
use crate::plot::{padded_range, FONT, LABEL_SIZE, SERIES_BLUE, TITLE_SIZE};
use crate::types::{BitcoinSeries, PlotOutcome};

pub const PRICE_COLUMN: &str = "PriceUSD";

/// Line chart of `PriceUSD` over `time`, written to `btc_price_history.png`.
pub fn plot_btc_price(series: &BitcoinSeries, cfg: &Config) -> Result<PlotOutcome> {
    let prices = series.metric(PRICE_COLUMN)?;
    let points: Vec<(DateTime<Utc>, f64)> = series
        .time
        .iter()
        .zip(prices)
        .filter_map(|(t, p)| Some(((*t)?, (*p)?)))
        .collect();

    if points.is_empty() {
        let reason = format!("no rows with both a timestamp and {PRICE_COLUMN}");
        warn!("Skipping Bitcoin price chart: {reason}");
        return Ok(PlotOutcome::Skipped(reason));
    }

    let path = cfg.plot_path(BTC_PRICE_PLOT);
    draw_price_history(&points, &path)?;
    info!("Saved {BTC_PRICE_PLOT}");
    Ok(PlotOutcome::Saved(path))
}

fn draw_price_history(points: &[(DateTime<Utc>, f64)], path: &Path) -> Result<()> {
    let mut first = points.iter().map(|p| p.0).min().unwrap_or_default();
    let mut last = points.iter().map(|p| p.0).max().unwrap_or_default();
    if first == last {
        first -= Duration::days(1);
        last += Duration::days(1);
    }
    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = padded_range(lo, hi);

    let root = BitMapBackend::new(path, chart_sizes::PRICE_HISTORY).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Bitcoin Price History", (FONT, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(90)
        .build_cartesian_2d(first..last, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price (USD)")
        .x_labels(10)
        .x_label_formatter(&|t: &DateTime<Utc>| t.format("%Y-%m").to_string())
        .y_label_formatter(&|v: &f64| with_thousands(*v, 0))
        .axis_desc_style((FONT, LABEL_SIZE))
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), SERIES_BLUE.stroke_width(2)))?
        .label("BTC Price (USD)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SERIES_BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
