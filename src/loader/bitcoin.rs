use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{AppError, LoadError, Result};
use crate::loader::timestamp::parse_timestamp;
use crate::types::BitcoinSeries;

pub const TIME_COLUMN: &str = "time";

/// Load the Coin Metrics CSV.
///
/// A missing file is `NotFound`; anything that goes wrong while reading the
/// rows or parsing `time` is `Malformed`.
pub fn load_bitcoin_data(path: &Path) -> std::result::Result<BitcoinSeries, LoadError> {
    info!("Loading Bitcoin data from {}...", path.display());
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let series = read_coinmetrics_csv(path).map_err(|e| LoadError::malformed(path, e))?;
    if series.is_empty() {
        warn!("{} has a header but no rows", path.display());
    }
    info!("Loaded {} Bitcoin rows.", series.len());
    Ok(series)
}

fn read_coinmetrics_csv(path: &Path) -> Result<BitcoinSeries> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let time_idx = headers
        .iter()
        .position(|h| h.trim() == TIME_COLUMN)
        .ok_or_else(|| AppError::MissingColumn {
            dataset: "Bitcoin",
            column: TIME_COLUMN.to_string(),
        })?;

    let mut time = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let raw_time = record.get(time_idx).unwrap_or("");
        let parsed = parse_timestamp(raw_time);
        if parsed.is_none() && !raw_time.trim().is_empty() {
            return Err(AppError::Timestamp {
                column: TIME_COLUMN.to_string(),
                row,
                value: raw_time.to_string(),
            });
        }
        time.push(parsed);

        for (idx, cell) in record.iter().enumerate() {
            if idx != time_idx {
                columns[idx].push(parse_number(cell));
            }
        }
    }

    let metrics: BTreeMap<String, Vec<Option<f64>>> = headers
        .iter()
        .zip(columns)
        .enumerate()
        .filter(|(idx, _)| *idx != time_idx)
        .map(|(_, (name, values))| (name.trim().to_string(), values))
        .collect();

    Ok(BitcoinSeries::new(time, metrics))
}

fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FIXTURE: &str = "\
time,PriceUSD,CapMrktCurUSD,HashRate,TxCnt
2021-01-01T00:00:00.000000000Z,100,1000,50,10
2021-01-02T00:00:00.000000000Z,110,1100,52,12
2021-01-03T00:00:00.000000000Z,90,900,49,
2021-01-04T00:00:00.000000000Z,105,1050,51,11
2021-01-05T00:00:00.000000000Z,95,950,50,9
";

    fn write_fixture(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("coinmetrics_btc.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_well_formed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_fixture(tmp.path(), FIXTURE);

        let series = load_bitcoin_data(&path).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.time.iter().all(Option::is_some));
        assert_eq!(
            series.metric("PriceUSD").unwrap(),
            &[Some(100.0), Some(110.0), Some(90.0), Some(105.0), Some(95.0)]
        );
        // blank cell is a missing value, not an error
        assert_eq!(series.metric("TxCnt").unwrap()[2], None);
        assert!(series.metric(TIME_COLUMN).is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.csv");
        match load_bitcoin_data(&path) {
            Err(LoadError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_time_column_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_fixture(tmp.path(), "date,PriceUSD\n2021-01-01,1\n");
        match load_bitcoin_data(&path) {
            Err(LoadError::Malformed { source: AppError::MissingColumn { column, .. }, .. }) => {
                assert_eq!(column, "time");
            }
            other => panic!("expected Malformed(MissingColumn), got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_fixture(tmp.path(), "time,PriceUSD\n2021-01-01,1\nyesterday,2\n");
        match load_bitcoin_data(&path) {
            Err(LoadError::Malformed { source: AppError::Timestamp { row, value, .. }, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected Malformed(Timestamp), got {other:?}"),
        }
    }

    #[test]
    fn ragged_row_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_fixture(tmp.path(), "time,PriceUSD\n2021-01-01,1,7\n");
        assert!(matches!(
            load_bitcoin_data(&path),
            Err(LoadError::Malformed { source: AppError::Csv(_), .. })
        ));
    }

    #[test]
    fn non_numeric_cells_become_missing() {
        assert_eq!(parse_number(" 42.5 "), Some(42.5));
        assert_eq!(parse_number("btc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn non_finite_cells_become_missing() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number("infinity"), None);
        assert_eq!(parse_number("NaN"), None);

        let tmp = tempfile::tempdir().unwrap();
        let path = write_fixture(tmp.path(), "time,PriceUSD\n2021-01-01,inf\n2021-01-02,5\n");
        let series = load_bitcoin_data(&path).unwrap();
        assert_eq!(series.metric("PriceUSD").unwrap(), &[None, Some(5.0)]);
    }
}
