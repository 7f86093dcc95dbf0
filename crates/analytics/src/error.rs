use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No data available for '{ticker}' between {start} and {end}")]
    NoDataAvailable {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Ratio '{0}' is undefined: the return series has zero variance")]
    UndefinedRatio(String),

    #[error("Insufficient overlap: {0}")]
    InsufficientOverlap(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Metric '{0}' did not produce a finite value")]
    NonFinite(String),

    #[error("Invalid series: {0}")]
    Series(#[from] CoreError),
}
