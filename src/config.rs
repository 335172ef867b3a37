use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const COINMETRICS_DIR: &str = "Coin Metrics";
pub const COINMETRICS_FILE: &str = "coinmetrics_btc.csv";
pub const POLYMARKET_DIR: &str = "Polymarket";

pub const MARKETS_FILE: &str = "finance_politics_markets.parquet";
pub const ODDS_HISTORY_FILE: &str = "finance_politics_odds_history.parquet";
pub const SUMMARY_FILE: &str = "finance_politics_summary.parquet";

pub const BTC_PRICE_PLOT: &str = "btc_price_history.png";
pub const BTC_CORRELATION_PLOT: &str = "btc_correlation_matrix.png";
pub const POLYMARKET_VOLUME_PLOT: &str = "polymarket_volume_by_category.png";

/// Number of categories shown in the volume bar chart.
pub const TOP_CATEGORIES: usize = 10;

/// Chart canvas sizes in pixels (figure inches × 100 dpi).
pub mod chart_sizes {
    pub const PRICE_HISTORY: (u32, u32) = (1200, 600);
    pub const CORRELATION: (u32, u32) = (800, 600);
    pub const CATEGORY_VOLUME: (u32, u32) = (1000, 600);
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub coinmetrics_path: PathBuf,
    pub polymarket_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Lay out paths around `script_dir`: data lives in the sibling `data`
    /// directory at the project root, plots under `script_dir/plots`.
    pub fn resolve(script_dir: impl AsRef<Path>) -> Self {
        let script_dir = script_dir.as_ref();
        let project_root = script_dir.parent().unwrap_or(script_dir);
        Self::with_dirs(project_root.join("data"), script_dir.join("plots"))
    }

    pub fn with_dirs(data_dir: impl Into<PathBuf>, plots_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            coinmetrics_path: data_dir.join(COINMETRICS_DIR).join(COINMETRICS_FILE),
            polymarket_dir: data_dir.join(POLYMARKET_DIR),
            plots_dir: plots_dir.into(),
            data_dir,
            log_level: "info".to_string(),
        }
    }

    /// Resolve against the crate directory, then apply `EDA_DATA_DIR`,
    /// `EDA_PLOTS_DIR` and `LOG_LEVEL` overrides.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::resolve(env!("CARGO_MANIFEST_DIR"));
        let data_dir = dir_override("EDA_DATA_DIR")?.unwrap_or(defaults.data_dir);
        let plots_dir = dir_override("EDA_PLOTS_DIR")?.unwrap_or(defaults.plots_dir);

        let mut cfg = Self::with_dirs(data_dir, plots_dir);
        cfg.log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Ok(cfg)
    }

    /// Create the plots directory if it doesn't exist yet.
    pub fn ensure_plots_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.plots_dir)?;
        Ok(())
    }

    pub fn plot_path(&self, file_name: &str) -> PathBuf {
        self.plots_dir.join(file_name)
    }
}

fn dir_override(var: &str) -> Result<Option<PathBuf>> {
    match std::env::var(var) {
        Ok(v) if v.trim().is_empty() => {
            Err(AppError::Config(format!("{var} is set but empty")))
        }
        Ok(v) => Ok(Some(PathBuf::from(v))),
        Err(_) => Ok(None),
    }
}
