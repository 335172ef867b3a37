use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::analysis::format::{count_with_thousands, with_thousands};
use crate::types::{span, MarketDataset, MarketsTable, OddsHistory, SummaryTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolymarketReport {
    pub markets: Option<MarketsOverview>,
    pub odds_records: Option<usize>,
    pub total_trades: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketsOverview {
    pub total: usize,
    pub active: Option<usize>,
    /// `(sum, mean)` over non-null volumes.
    pub volume: Option<(f64, f64)>,
    pub created: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub end_dates: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl MarketsOverview {
    pub fn closed(&self) -> Option<usize> {
        self.active.map(|a| self.total - a)
    }
}

/// Aggregate whatever Polymarket tables were loaded and print the result.
pub fn summarize_polymarket(dataset: &MarketDataset) -> PolymarketReport {
    let MarketDataset { markets, odds, summary } = dataset;

    let report = PolymarketReport {
        markets: markets.as_ref().map(markets_overview),
        odds_records: odds.as_ref().map(|o: &OddsHistory| o.rows),
        total_trades: summary.as_ref().and_then(total_trades),
    };
    println!("{report}");
    report
}

fn markets_overview(markets: &MarketsTable) -> MarketsOverview {
    let active = markets
        .active
        .as_ref()
        .map(|col| col.iter().filter(|v| **v == Some(true)).count());

    let volume = markets.volume.as_ref().map(|col| {
        let present: Vec<f64> = col.iter().flatten().copied().collect();
        let sum: f64 = present.iter().sum();
        let mean = if present.is_empty() {
            f64::NAN
        } else {
            sum / present.len() as f64
        };
        (sum, mean)
    });

    MarketsOverview {
        total: markets.rows,
        active,
        volume,
        created: markets.created_at.as_deref().and_then(span),
        end_dates: markets.end_date.as_deref().and_then(span),
    }
}

fn total_trades(summary: &SummaryTable) -> Option<f64> {
    summary
        .trade_count
        .as_ref()
        .map(|col| col.iter().flatten().sum())
}

/// Total volume per category, largest first, at most `limit` entries.
/// Rows without a category are dropped; null volumes count as zero. Ties are
/// broken by category name. `None` when either column is missing.
pub fn top_categories_by_volume(markets: &MarketsTable, limit: usize) -> Option<Vec<(String, f64)>> {
    let categories = markets.category.as_ref()?;
    let volumes = markets.volume.as_ref()?;

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (category, volume) in categories.iter().zip(volumes) {
        let Some(category) = category else { continue };
        *totals.entry(category.as_str()).or_insert(0.0) += volume.unwrap_or(0.0);
    }

    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    Some(ranked)
}

impl fmt::Display for PolymarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n--- Polymarket Data Summary ---")?;

        if let Some(m) = &self.markets {
            writeln!(f, "Total Markets: {}", m.total)?;
            if let (Some(active), Some(closed)) = (m.active, m.closed()) {
                writeln!(f, "Active Markets: {active}")?;
                writeln!(f, "Closed Markets: {closed}")?;
            }
            if let Some((sum, mean)) = m.volume {
                writeln!(f, "Total Volume: {}", with_thousands(sum, 2))?;
                writeln!(f, "Average Volume per Market: {}", with_thousands(mean, 2))?;
            }
            if let Some((first, last)) = m.created {
                writeln!(f, "Created: {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))?;
            }
            if let Some((first, last)) = m.end_dates {
                writeln!(f, "End Dates: {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))?;
            }
        }

        if let Some(records) = self.odds_records {
            writeln!(f, "Odds History Records: {}", count_with_thousands(records))?;
        }

        if let Some(trades) = self.total_trades {
            writeln!(f, "Total Trades: {}", with_thousands(trades, 0))?;
        }
        Ok(())
    }
}
