use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Missing column '{column}' in {dataset} data")]
    MissingColumn {
        dataset: &'static str,
        column: String,
    },

    #[error("Unparseable timestamp '{value}' in column '{column}' (row {row})")]
    Timestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{column}' has type {dtype}, expected a date-time")]
    ColumnType { column: String, dtype: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl<E> From<DrawingAreaErrorKind<E>> for AppError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        AppError::Render(e.to_string())
    }
}

/// Outcome of a loader that did not produce a dataset.
///
/// `NotFound` is expected (the data simply isn't there yet) and only skips the
/// dependent steps. `Malformed` carries the underlying failure so it can be
/// reported in full.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed data in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: AppError,
    },
}

impl LoadError {
    pub fn malformed(path: impl Into<PathBuf>, source: AppError) -> Self {
        LoadError::Malformed {
            path: path.into(),
            source,
        }
    }
}
