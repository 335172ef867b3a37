use std::fmt;

use chrono::{DateTime, Utc};

use crate::analysis::stats::{CorrelationMatrix, Describe, STAT_LABELS};
use crate::config::{Config, BTC_CORRELATION_PLOT};
use crate::error::Result;
use crate::plot::heatmap::plot_correlation_heatmap;
use crate::types::{BitcoinSeries, PlotOutcome};

pub const SUMMARY_COLUMNS: [&str; 3] = ["PriceUSD", "CapMrktCurUSD", "HashRate"];
pub const CORRELATION_COLUMNS: [&str; 4] = ["PriceUSD", "CapMrktCurUSD", "HashRate", "TxCnt"];

#[derive(Debug, Clone)]
pub struct BitcoinReport {
    pub rows: usize,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub summary: Vec<(String, Describe)>,
    pub correlation: CorrelationMatrix,
    pub heatmap: PlotOutcome,
}

/// Print the describe table for the headline metrics, then render the
/// correlation heatmap. A missing metric column aborts with
/// `AppError::MissingColumn`.
pub fn analyze_btc_metrics(series: &BitcoinSeries, cfg: &Config) -> Result<BitcoinReport> {
    let summary = SUMMARY_COLUMNS
        .iter()
        .map(|&name| -> Result<(String, Describe)> {
            Ok((name.to_string(), Describe::of(series.metric(name)?)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut columns = Vec::with_capacity(CORRELATION_COLUMNS.len());
    for name in CORRELATION_COLUMNS {
        columns.push((name, series.metric(name)?));
    }
    let correlation = CorrelationMatrix::compute(&columns);

    let rows = series.len();
    let time_range = series.time_range();
    println!("{}", SummaryBlock { rows, time_range, summary: &summary });

    let heatmap = plot_correlation_heatmap(
        &correlation,
        "Correlation of Bitcoin Metrics",
        &cfg.plot_path(BTC_CORRELATION_PLOT),
    )?;

    Ok(BitcoinReport {
        rows,
        time_range,
        summary,
        correlation,
        heatmap,
    })
}

struct SummaryBlock<'a> {
    rows: usize,
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    summary: &'a [(String, Describe)],
}

impl fmt::Display for SummaryBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n--- Bitcoin Data Summary ---")?;
        match self.time_range {
            Some((first, last)) => writeln!(
                f,
                "Rows: {} ({} to {})",
                self.rows,
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?,
            None => writeln!(f, "Rows: {}", self.rows)?,
        }
        write!(f, "{}", DescribeTable(self.summary))
    }
}

/// Column-aligned describe table, one column per metric.
struct DescribeTable<'a>(&'a [(String, Describe)]);

impl fmt::Display for DescribeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .0
            .iter()
            .map(|(_, d)| d.values().iter().map(|v| format_cell(*v)).collect())
            .collect();
        let widths: Vec<usize> = self
            .0
            .iter()
            .zip(&cells)
            .map(|((name, _), col)| {
                col.iter().map(String::len).chain([name.len()]).max().unwrap_or(0) + 2
            })
            .collect();

        write!(f, "{:<6}", "")?;
        for ((name, _), &width) in self.0.iter().zip(&widths) {
            write!(f, "{name:>width$}")?;
        }
        writeln!(f)?;

        for (row, label) in STAT_LABELS.iter().enumerate() {
            write!(f, "{label:<6}")?;
            for (col, &width) in cells.iter().zip(&widths) {
                write!(f, "{:>width$}", col[row])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::TimeZone;

    fn series(prices: &[f64]) -> BitcoinSeries {
        let n = prices.len();
        let time = (0..n)
            .map(|i| Some(Utc.with_ymd_and_hms(2021, 1, 1 + i as u32, 0, 0, 0).unwrap()))
            .collect();
        let mut metrics = BTreeMap::new();
        metrics.insert("PriceUSD".to_string(), prices.iter().map(|&p| Some(p)).collect());
        metrics.insert("CapMrktCurUSD".to_string(), prices.iter().map(|&p| Some(p * 19e6)).collect());
        metrics.insert("HashRate".to_string(), (0..n).map(|i| Some(100.0 + i as f64)).collect());
        metrics.insert("TxCnt".to_string(), (0..n).map(|i| Some(300_000.0 - i as f64 * 7.0)).collect());
        BitcoinSeries::new(time, metrics)
    }

    #[test]
    fn mean_of_known_fixture_is_exact() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::with_dirs(tmp.path().join("data"), tmp.path().join("plots"));
        cfg.ensure_plots_dir().unwrap();

        let report = analyze_btc_metrics(&series(&[100.0, 110.0, 90.0, 105.0, 95.0]), &cfg).unwrap();
        let (_, price) = report.summary.iter().find(|(name, _)| name == "PriceUSD").unwrap();
        assert_eq!(price.mean, 100.0);
        assert_eq!(price.count, 5);

        let printed = SummaryBlock {
            rows: report.rows,
            time_range: report.time_range,
            summary: &report.summary,
        }
        .to_string();
        assert!(printed.contains("--- Bitcoin Data Summary ---"));
        assert!(printed.contains("Rows: 5 (2021-01-01 to 2021-01-05)"));
        assert!(printed.contains("100.000000"));

        assert_eq!(report.heatmap, PlotOutcome::Saved(cfg.plot_path(BTC_CORRELATION_PLOT)));
        assert!(cfg.plot_path(BTC_CORRELATION_PLOT).is_file());
    }

    #[test]
    fn price_and_cap_are_perfectly_correlated() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::with_dirs(tmp.path().join("data"), tmp.path().join("plots"));
        cfg.ensure_plots_dir().unwrap();

        let report = analyze_btc_metrics(&series(&[1.0, 3.0, 2.0, 5.0]), &cfg).unwrap();
        assert_eq!(report.correlation.labels, CORRELATION_COLUMNS.to_vec());
        assert!((report.correlation.get(0, 1) - 1.0).abs() < 1e-9);
        assert!((report.correlation.get(2, 3) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_metric_aborts_before_rendering() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::with_dirs(tmp.path().join("data"), tmp.path().join("plots"));
        cfg.ensure_plots_dir().unwrap();

        let mut metrics = BTreeMap::new();
        metrics.insert("PriceUSD".to_string(), vec![Some(1.0)]);
        let partial = BitcoinSeries::new(vec![None], metrics);

        assert!(analyze_btc_metrics(&partial, &cfg).is_err());
        assert!(!cfg.plot_path(BTC_CORRELATION_PLOT).exists());
    }

    #[test]
    fn table_lists_every_statistic() {
        let rendered = DescribeTable(&[("PriceUSD".to_string(), Describe::of(&[Some(1.0), Some(2.0)]))]).to_string();
        for label in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
            assert!(rendered.contains(label), "missing {label} in\n{rendered}");
        }
        assert!(rendered.contains("PriceUSD"));
    }
}
