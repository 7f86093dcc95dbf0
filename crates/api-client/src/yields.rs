use crate::error::ApiError;
use crate::{PriceProvider, RateSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;
use std::sync::Arc;

/// Reads yields from the closes of a quoted rate ticker (e.g. `^TNX`).
#[derive(Clone)]
pub struct TickerYieldSource {
    provider: Arc<dyn PriceProvider>,
    ticker: String,
}

impl TickerYieldSource {
    pub fn new(provider: Arc<dyn PriceProvider>, ticker: impl Into<String>) -> Self {
        Self {
            provider,
            ticker: ticker.into(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }
}

#[async_trait]
impl RateSource for TickerYieldSource {
    async fn fetch_yields(&self, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ApiError> {
        tracing::debug!(ticker = %self.ticker, %start, %end, "Fetching risk-free yields.");
        self.provider.fetch_history(&self.ticker, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryProvider;

    #[tokio::test]
    async fn delegates_to_the_rate_ticker() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let provider = InMemoryProvider::new().with_closes("^TNX", &[(d(1), 4.2), (d(4), 4.3)]);
        let source = TickerYieldSource::new(Arc::new(provider), "^TNX");

        let yields = source.fetch_yields(d(1), d(31)).await.unwrap();
        assert_eq!(yields.ticker(), "^TNX");
        assert_eq!(yields.len(), 2);
    }
}
