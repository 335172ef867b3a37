use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::analysis::{analyze_btc_metrics, summarize_polymarket};
use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::loader::{load_bitcoin_data, load_polymarket_data};
use crate::plot::{plot_btc_price, plot_polymarket_volume};
use crate::types::PlotOutcome;

pub const COMPLETION_MESSAGE: &str =
    "EDA Layout Complete. Check the 'plots' directory for visualizations.";

/// What a run managed to load and which chart files it wrote.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub bitcoin_loaded: bool,
    pub polymarket_loaded: bool,
    pub plots: Vec<PathBuf>,
}

impl RunReport {
    fn record(&mut self, outcome: PlotOutcome) {
        match outcome.saved_path() {
            Some(path) => self.plots.push(path.clone()),
            None => debug!("Chart skipped: {outcome:?}"),
        }
    }
}

/// Load both datasets, then summarize and chart whichever of them loaded.
///
/// A dataset that is missing or unreadable only skips its own steps. Errors
/// raised after a successful load (missing metric columns, IO, rendering)
/// abort the run.
pub fn run(cfg: &Config) -> Result<RunReport> {
    cfg.ensure_plots_dir()?;
    let mut report = RunReport::default();

    match load_bitcoin_data(&cfg.coinmetrics_path) {
        Ok(series) => {
            report.bitcoin_loaded = true;
            let btc = analyze_btc_metrics(&series, cfg)?;
            report.record(btc.heatmap);
            report.record(plot_btc_price(&series, cfg)?);
        }
        Err(e) => log_load_failure("Bitcoin", &e),
    }

    match load_polymarket_data(&cfg.polymarket_dir) {
        Ok(dataset) => {
            report.polymarket_loaded = true;
            summarize_polymarket(&dataset);
            if let Some(markets) = &dataset.markets {
                report.record(plot_polymarket_volume(markets, cfg)?);
            }
        }
        Err(e) => log_load_failure("Polymarket", &e),
    }

    println!("\n{COMPLETION_MESSAGE}");
    Ok(report)
}

fn log_load_failure(dataset: &str, e: &LoadError) {
    match e {
        LoadError::NotFound(path) => warn!("{dataset} data not found at {}, skipping", path.display()),
        LoadError::Malformed { .. } => error!("Error loading {dataset} data: {e}"),
    }
}
