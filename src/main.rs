mod analysis;
mod config;
mod error;
mod loader;
mod pipeline;
mod plot;
mod types;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pipeline::run;

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    info!(
        "Data directory: {}, plots directory: {}",
        cfg.data_dir.display(),
        cfg.plots_dir.display()
    );

    match run(&cfg) {
        Ok(report) => info!(
            "Run finished (bitcoin loaded: {}, polymarket loaded: {}, {} plot(s) in {})",
            report.bitcoin_loaded,
            report.polymarket_loaded,
            report.plots.len(),
            cfg.plots_dir.display()
        ),
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}
