use crate::error::ApiError;
use crate::responses::ChartResponse;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use configuration::ProviderConfig;
use core_types::PriceSeries;
use std::time::Duration;

pub mod error;
pub mod memory;
pub mod responses;
pub mod yields;
// --- Public API ---
pub use memory::InMemoryProvider;
pub use yields::TickerYieldSource;

/// The abstract interface for a daily price history source.
/// This trait is the contract the report engine uses, allowing the
/// underlying implementation (live or fixture) to be swapped out.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches daily bars for `ticker` dated within `[start, end]`.
    ///
    /// Returns `ApiError::NoData` when the ticker is unknown or did not trade in the window.
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError>;
}

/// A source of daily government short-rate yields, quoted in percent.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_yields(&self, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ApiError>;
}

/// A concrete implementation of the `PriceProvider` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url, encode_symbol(ticker))
    }
}

/// Percent-encodes the characters index symbols use (`^TNX`, `BRK.B` is left alone).
fn encode_symbol(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| match c {
            '^' => "%5E".to_string(),
            '=' => "%3D".to_string(),
            '/' => "%2F".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// 404 means the provider has no such ticker; any other non-2xx is a transport failure.
fn check_status(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    status: reqwest::StatusCode,
) -> Result<(), ApiError> {
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NoData {
            ticker: ticker.to_string(),
            start,
            end,
        });
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            ticker: ticker.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let url = self.chart_url(ticker);
        // period2 is exclusive, so ask for midnight after the last wanted day.
        let period2 = unix_midnight(end.succ_opt().unwrap_or(end));

        tracing::debug!(ticker, %start, %end, "Requesting daily history.");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", unix_midnight(start).to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        check_status(ticker, start, end, status)?;
        let text = response.text().await?;

        let chart = serde_json::from_str::<ChartResponse>(&text).map_err(|e| {
            ApiError::Deserialization(format!("{} (HTTP {}): {}", ticker, status, e))
        })?;
        let series = chart.into_price_series(ticker, start, end)?;

        tracing::debug!(ticker, bars = series.len(), "Received daily history.");
        Ok(series)
    }
}
