use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The data provider returned an error [{code}]: {description}")]
    Provider { code: String, description: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("The data provider answered HTTP {status} for '{ticker}'")]
    Status { ticker: String, status: u16 },

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No price data available for '{ticker}' between {start} and {end}")]
    NoData {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        ApiError::InvalidData(error.to_string())
    }
}
