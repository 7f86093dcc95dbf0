use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::{PriceBar, PriceSeries};
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The envelope of a `GET /v8/finance/chart/{symbol}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// Represents an error payload returned inside the chart envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    // Absent entirely when the window holds no trading days.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    /// Seconds east of UTC for the listing exchange.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    pub quote: Vec<QuoteColumns>,
    pub adjclose: Option<Vec<AdjCloseColumn>>,
}

/// Column-oriented OHLC values; individual cells are null on halted days.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteColumns {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjCloseColumn {
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Converts the column-oriented payload into a `PriceSeries`.
    ///
    /// Rows without a close are dropped, rows outside `[start, end]` are dropped, and a
    /// repeated date (the provider appends a live row for the current session) keeps
    /// the later row.
    pub fn into_price_series(
        self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let no_data = || ApiError::NoData {
            ticker: ticker.to_string(),
            start,
            end,
        };

        if let Some(error) = self.chart.error {
            return Err(ApiError::Provider {
                code: error.code,
                description: error.description,
            });
        }

        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(no_data)?;
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = result
            .indicators
            .adjclose
            .and_then(|columns| columns.into_iter().next())
            .map(|column| column.adjclose)
            .unwrap_or_default();

        let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(close) = cell(&quote.close, i) else {
                continue;
            };
            let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ts)))?
                .date_naive();
            if date < start || date > end {
                continue;
            }

            let bar = PriceBar {
                date,
                open: cell(&quote.open, i).unwrap_or(close),
                high: cell(&quote.high, i).unwrap_or(close),
                low: cell(&quote.low, i).unwrap_or(close),
                close,
                adj_close: cell(&adjclose, i),
            };

            match bars.last_mut() {
                Some(last) if last.date == date => *last = bar,
                Some(last) if last.date > date => {
                    return Err(ApiError::InvalidData(format!(
                        "{}: rows out of order ({} after {})",
                        ticker, date, last.date
                    )));
                }
                _ => bars.push(bar),
            }
        }

        if bars.is_empty() {
            return Err(no_data());
        }

        Ok(PriceSeries::new(ticker, start, end, bars)?)
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten().filter(|v| v.is_finite())
}
