use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{MARKETS_FILE, ODDS_HISTORY_FILE, SUMMARY_FILE};
use crate::error::{AppError, LoadError, Result};
use crate::loader::timestamp::parse_timestamp;
use crate::types::{MarketDataset, MarketsTable, OddsHistory, SummaryTable};

/// Load whichever of the three Polymarket tables exist under `dir`.
///
/// Missing files are skipped. If none of them exist the whole dataset is
/// `NotFound`; a file that exists but can't be read is `Malformed`.
pub fn load_polymarket_data(dir: &Path) -> std::result::Result<MarketDataset, LoadError> {
    info!("Loading Polymarket data from {}...", dir.display());

    let markets = load_member(&dir.join(MARKETS_FILE), read_markets)?;
    if let Some(m) = &markets {
        info!("Loaded {} markets.", m.rows);
    }

    let odds = load_member(&dir.join(ODDS_HISTORY_FILE), read_odds_history)?;
    if let Some(o) = &odds {
        info!("Loaded {} odds history records.", o.rows);
        debug!("Odds history columns: {:?}", o.columns);
    }

    let summary = load_member(&dir.join(SUMMARY_FILE), read_summary)?;
    if let Some(s) = &summary {
        info!("Loaded {} summary rows.", s.rows);
    }

    let dataset = MarketDataset { markets, odds, summary };
    if dataset.is_empty() {
        return Err(LoadError::NotFound(dir.to_path_buf()));
    }
    Ok(dataset)
}

fn load_member<T>(
    path: &Path,
    read: impl FnOnce(&DataFrame) -> Result<T>,
) -> std::result::Result<Option<T>, LoadError> {
    if !path.is_file() {
        debug!("{} not present, skipping", path.display());
        return Ok(None);
    }
    read_parquet(path)
        .and_then(|df| read(&df))
        .map(Some)
        .map_err(|e| LoadError::malformed(path, e))
}

fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

fn read_markets(df: &DataFrame) -> Result<MarketsTable> {
    Ok(MarketsTable {
        rows: df.height(),
        category: string_column(df, "category")?,
        volume: f64_column(df, "volume")?,
        active: bool_column(df, "active")?,
        created_at: datetime_column(df, "created_at")?,
        end_date: datetime_column(df, "end_date")?,
    })
}

fn read_odds_history(df: &DataFrame) -> Result<OddsHistory> {
    Ok(OddsHistory {
        rows: df.height(),
        columns: df.get_column_names().into_iter().map(|c| c.to_string()).collect(),
    })
}

fn read_summary(df: &DataFrame) -> Result<SummaryTable> {
    Ok(SummaryTable {
        rows: df.height(),
        trade_count: f64_column(df, "trade_count")?,
    })
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

fn f64_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(series) = df.column(name) else {
        return Ok(None);
    };
    let values = series.cast(&DataType::Float64)?;
    let values = values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(Some(values))
}

fn bool_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<bool>>>> {
    let Ok(series) = df.column(name) else {
        return Ok(None);
    };
    let values = series.cast(&DataType::Boolean)?;
    let values = values.bool()?.into_iter().collect();
    Ok(Some(values))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    let Ok(series) = df.column(name) else {
        return Ok(None);
    };
    let values = series.cast(&DataType::String)?;
    let values = values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(Some(values))
}

/// Read a date-time column stored as Parquet Datetime, Date, or text.
fn datetime_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<DateTime<Utc>>>>> {
    let Ok(series) = df.column(name) else {
        return Ok(None);
    };

    let values: Vec<Option<DateTime<Utc>>> = match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            let values: Vec<_> = raw
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|t| from_epoch(t, unit)))
                .collect();
            values
        }
        DataType::Date => {
            let raw = series.cast(&DataType::Int32)?;
            let values: Vec<_> = raw.i32()?.into_iter().map(|v| v.and_then(from_epoch_days)).collect();
            values
        }
        DataType::String => {
            let mut values = Vec::with_capacity(series.len());
            for (row, cell) in series.str()?.into_iter().enumerate() {
                let parsed = match cell {
                    Some(raw) if !raw.trim().is_empty() => {
                        Some(parse_timestamp(raw).ok_or_else(|| AppError::Timestamp {
                            column: name.to_string(),
                            row,
                            value: raw.to_string(),
                        })?)
                    }
                    _ => None,
                };
                values.push(parsed);
            }
            values
        }
        other => {
            return Err(AppError::ColumnType {
                column: name.to_string(),
                dtype: other.to_string(),
            })
        }
    };
    Ok(Some(values))
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }
}

fn from_epoch_days(days: i32) -> Option<DateTime<Utc>> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let date = epoch.checked_add_signed(chrono::Duration::days(i64::from(days)))?;
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn write_parquet(path: &Path, mut df: DataFrame) {
        let mut file = File::create(path).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();
    }

    #[test]
    fn only_summary_present() {
        let tmp = tempfile::tempdir().unwrap();
        let df = df!("market_id" => &["a", "b"], "trade_count" => &[3i64, 4]).unwrap();
        write_parquet(&tmp.path().join(SUMMARY_FILE), df);

        let dataset = load_polymarket_data(tmp.path()).unwrap();
        assert_eq!(dataset.members(), vec!["summary"]);
        let summary = dataset.summary.unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.trade_count, Some(vec![Some(3.0), Some(4.0)]));
    }

    #[test]
    fn empty_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_polymarket_data(tmp.path()),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn markets_columns_and_dates() {
        let tmp = tempfile::tempdir().unwrap();
        let df = df!(
            "category" => &[Some("Politics"), None, Some("Finance")],
            "volume" => &[Some(10.5), Some(2.0), None],
            "active" => &[true, false, true],
            "created_at" => &["2024-01-01T00:00:00Z", "2024-02-01 12:00:00", ""],
        )
        .unwrap();
        write_parquet(&tmp.path().join(MARKETS_FILE), df);

        let markets = load_polymarket_data(tmp.path()).unwrap().markets.unwrap();
        assert_eq!(markets.rows, 3);
        assert_eq!(
            markets.category,
            Some(vec![Some("Politics".to_string()), None, Some("Finance".to_string())])
        );
        assert_eq!(markets.volume, Some(vec![Some(10.5), Some(2.0), None]));
        assert_eq!(markets.active, Some(vec![Some(true), Some(false), Some(true)]));
        assert_eq!(
            markets.created_at,
            Some(vec![
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()),
                None,
            ])
        );
        assert!(markets.end_date.is_none());
    }

    #[test]
    fn unparseable_market_date_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let df = df!("end_date" => &["soon"]).unwrap();
        write_parquet(&tmp.path().join(MARKETS_FILE), df);

        match load_polymarket_data(tmp.path()) {
            Err(LoadError::Malformed { source: AppError::Timestamp { column, .. }, .. }) => {
                assert_eq!(column, "end_date");
            }
            other => panic!("expected Malformed(Timestamp), got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(ODDS_HISTORY_FILE), b"definitely not parquet").unwrap();
        assert!(matches!(
            load_polymarket_data(tmp.path()),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn odds_history_keeps_shape_only() {
        let tmp = tempfile::tempdir().unwrap();
        let df = df!("market_id" => &["a", "a", "b"], "price" => &[0.4, 0.5, 0.6]).unwrap();
        write_parquet(&tmp.path().join(ODDS_HISTORY_FILE), df);

        let odds = load_polymarket_data(tmp.path()).unwrap().odds.unwrap();
        assert_eq!(odds.rows, 3);
        assert_eq!(odds.columns, vec!["market_id".to_string(), "price".to_string()]);
    }

    #[test]
    fn epoch_days_to_midnight() {
        assert_eq!(
            from_epoch_days(19_723),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }
}
