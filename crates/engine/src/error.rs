use analytics::AnalyticsError;
use api_client::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Market data error: {0}")]
    Api(ApiError),

    #[error("{0}")]
    Analytics(#[from] AnalyticsError),
}

/// A provider that has nothing for the window surfaces as the analytics
/// `NoDataAvailable` condition; every other provider failure stays an `Api` error.
impl From<ApiError> for EngineError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NoData { ticker, start, end } => {
                EngineError::Analytics(AnalyticsError::NoDataAvailable { ticker, start, end })
            }
            other => EngineError::Api(other),
        }
    }
}
