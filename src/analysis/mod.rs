pub mod bitcoin;
pub mod format;
pub mod polymarket;
pub mod stats;

pub use bitcoin::analyze_btc_metrics;
pub use polymarket::summarize_polymarket;
