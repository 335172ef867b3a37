use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Bitcoin series
// ---------------------------------------------------------------------------

/// Coin Metrics daily series, stored column by column.
///
/// `time` holds `None` for empty cells. Every other CSV column is kept as a
/// numeric column; cells that don't parse as numbers become `None`. Which
/// metrics exist is not checked here: asking for a missing one through
/// [`BitcoinSeries::metric`] is a structural error.
#[derive(Debug, Clone, Default)]
pub struct BitcoinSeries {
    pub time: Vec<Option<DateTime<Utc>>>,
    metrics: BTreeMap<String, Vec<Option<f64>>>,
}

impl BitcoinSeries {
    pub fn new(time: Vec<Option<DateTime<Utc>>>, metrics: BTreeMap<String, Vec<Option<f64>>>) -> Self {
        Self { time, metrics }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn metric(&self, name: &str) -> Result<&[Option<f64>]> {
        self.metrics
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::MissingColumn {
                dataset: "Bitcoin",
                column: name.to_string(),
            })
    }

    /// Earliest and latest timestamps, ignoring missing ones.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        span(&self.time)
    }
}

// ---------------------------------------------------------------------------
// Polymarket dataset
// ---------------------------------------------------------------------------

/// Market metadata. Each optional column is `None` when the file doesn't
/// carry it at all; null cells inside a present column are `None` entries.
#[derive(Debug, Clone, Default)]
pub struct MarketsTable {
    pub rows: usize,
    pub category: Option<Vec<Option<String>>>,
    pub volume: Option<Vec<Option<f64>>>,
    pub active: Option<Vec<Option<bool>>>,
    pub created_at: Option<Vec<Option<DateTime<Utc>>>>,
    pub end_date: Option<Vec<Option<DateTime<Utc>>>>,
}

#[derive(Debug, Clone, Default)]
pub struct OddsHistory {
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    pub rows: usize,
    pub trade_count: Option<Vec<Option<f64>>>,
}

/// The three Polymarket tables. Each member is present only if its file was
/// found.
#[derive(Debug, Clone, Default)]
pub struct MarketDataset {
    pub markets: Option<MarketsTable>,
    pub odds: Option<OddsHistory>,
    pub summary: Option<SummaryTable>,
}

impl MarketDataset {
    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Names of the members that were loaded, in file order.
    pub fn members(&self) -> Vec<&'static str> {
        let MarketDataset { markets, odds, summary } = self;
        let mut names = Vec::new();
        if markets.is_some() {
            names.push("markets");
        }
        if odds.is_some() {
            names.push("odds");
        }
        if summary.is_some() {
            names.push("summary");
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Plot artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutcome {
    Saved(PathBuf),
    /// Nothing was drawn and no file was written.
    Skipped(String),
}

impl PlotOutcome {
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match self {
            PlotOutcome::Saved(path) => Some(path),
            PlotOutcome::Skipped(_) => None,
        }
    }
}

pub fn span(values: &[Option<DateTime<Utc>>]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut present = values.iter().flatten();
    let first = *present.next()?;
    Some(present.fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_metric_is_structural_error() {
        let series = BitcoinSeries::default();
        match series.metric("PriceUSD") {
            Err(AppError::MissingColumn { dataset, column }) => {
                assert_eq!(dataset, "Bitcoin");
                assert_eq!(column, "PriceUSD");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn span_skips_missing_timestamps() {
        let a = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(span(&[Some(a), None, Some(b)]), Some((b, a)));
        assert_eq!(span(&[None, None]), None);
    }

    #[test]
    fn dataset_members_follow_presence() {
        let dataset = MarketDataset {
            summary: Some(SummaryTable::default()),
            ..Default::default()
        };
        assert_eq!(dataset.members(), vec!["summary"]);
        assert!(!dataset.is_empty());
        assert!(MarketDataset::default().is_empty());
    }
}
