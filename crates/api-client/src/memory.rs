use crate::error::ApiError;
use crate::PriceProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceBar, PriceSeries};
use std::collections::HashMap;

/// A fixed, in-process price source.
///
/// Serves the bars it was built with, clipped to the requested window. Used for
/// deterministic tests and for running the analysis offline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the full history of one ticker. Bars are sorted by date.
    pub fn with_series(mut self, ticker: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        self.series.insert(ticker.to_uppercase(), bars);
        self
    }

    /// Registers a ticker from `(date, close)` points.
    pub fn with_closes(self, ticker: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|&(date, price)| PriceBar::flat(date, price))
            .collect();
        self.with_series(ticker, bars)
    }
}

#[async_trait]
impl PriceProvider for InMemoryProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let bars: Vec<PriceBar> = self
            .series
            .get(&ticker.to_uppercase())
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if bars.is_empty() {
            return Err(ApiError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }

        Ok(PriceSeries::new(ticker, start, end, bars)?)
    }
}
