use crate::error::EngineError;
use analytics::{AnalyticsEngine, PairInput, PortfolioReport};
use api_client::{PriceProvider, RateSource, TickerYieldSource, YahooClient};
use chrono::NaiveDate;
use configuration::{AnalysisConfig, Config};
use core_types::{PairSpec, PriceField, PriceSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod error;

/// Upper bound on the pairs one submission may carry.
pub const MAX_PAIRS: usize = 50;

/// One submission: N pairs and a start date, evaluated up to `as_of`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub pairs: Vec<PairSpec>,
    pub start_date: NaiveDate,
    pub as_of: NaiveDate,
}

impl ReportRequest {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.pairs.is_empty() {
            return Err(EngineError::InvalidRequest(
                "at least one pair is required".to_string(),
            ));
        }
        if self.pairs.len() > MAX_PAIRS {
            return Err(EngineError::InvalidRequest(format!(
                "at most {} pairs are supported, got {}",
                MAX_PAIRS,
                self.pairs.len()
            )));
        }
        if self.start_date > self.as_of {
            return Err(EngineError::InvalidRequest(format!(
                "start date {} is after {}",
                self.start_date, self.as_of
            )));
        }
        Ok(())
    }

    /// Distinct tickers in first-seen order.
    fn tickers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for pair in &self.pairs {
            for ticker in [pair.long.as_str(), pair.short.as_str()] {
                if !seen.contains(&ticker) {
                    seen.push(ticker);
                }
            }
        }
        seen
    }
}

/// The request orchestrator: fetches every series a submission needs, then hands
/// them to the `AnalyticsEngine`.
///
/// Fetches run one after another and the first failure aborts the whole request.
#[derive(Clone)]
pub struct ReportEngine {
    prices: Arc<dyn PriceProvider>,
    rates: Arc<dyn RateSource>,
    analytics: AnalyticsEngine,
    preferred_field: PriceField,
}

impl ReportEngine {
    pub fn new(
        prices: Arc<dyn PriceProvider>,
        rates: Arc<dyn RateSource>,
        analysis: &AnalysisConfig,
    ) -> Self {
        Self {
            prices,
            rates,
            analytics: AnalyticsEngine::new(analysis.trading_days_per_year),
            preferred_field: analysis.price_field,
        }
    }

    /// Wires the live Yahoo client for both prices and yields.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let client = YahooClient::new(&config.provider)
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let prices: Arc<dyn PriceProvider> = Arc::new(client);
        let rates = Arc::new(TickerYieldSource::new(
            prices.clone(),
            config.analysis.risk_free_ticker.clone(),
        ));
        Ok(Self::new(prices, rates, &config.analysis))
    }

    pub async fn run(&self, request: &ReportRequest) -> Result<PortfolioReport, EngineError> {
        request.validate()?;
        tracing::info!(
            pairs = request.pairs.len(),
            start = %request.start_date,
            as_of = %request.as_of,
            "Starting pair report."
        );

        let yields = self.rates.fetch_yields(request.start_date, request.as_of).await?;
        let risk_free_rate = self.analytics.risk_free_rate(&yields)?;

        let mut histories: BTreeMap<&str, PriceSeries> = BTreeMap::new();
        for ticker in request.tickers() {
            let series = self
                .prices
                .fetch_history(ticker, request.start_date, request.as_of)
                .await?;
            tracing::debug!(ticker, bars = series.len(), "Fetched history.");
            histories.insert(ticker, series);
        }

        let inputs = request
            .pairs
            .iter()
            .map(|pair| {
                Ok(PairInput {
                    pair,
                    long: lookup(&histories, &pair.long)?,
                    short: lookup(&histories, &pair.short)?,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let report = self.analytics.analyze(
            &inputs,
            self.preferred_field,
            request.start_date,
            request.as_of,
            risk_free_rate,
        )?;
        Ok(report)
    }
}

fn lookup<'a>(
    histories: &'a BTreeMap<&str, PriceSeries>,
    ticker: &str,
) -> Result<&'a PriceSeries, EngineError> {
    histories
        .get(ticker)
        .ok_or_else(|| EngineError::InvalidRequest(format!("ticker '{}' was not fetched", ticker)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsError;
    use api_client::error::ApiError;
    use api_client::InMemoryProvider;
    use async_trait::async_trait;
    use chrono::Days;
    use core_types::PriceBar;
    use mockall::mock;
    use mockall::predicate::*;
    use rust_decimal::Decimal;

    mock! {
        pub Prices {}

        #[async_trait]
        impl PriceProvider for Prices {
            async fn fetch_history(
                &self,
                ticker: &str,
                start: NaiveDate,
                end: NaiveDate,
            ) -> Result<PriceSeries, ApiError>;
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// 200 calendar days of synthetic closes from 2023-07-17.
    fn bars(ticker: &str) -> Vec<PriceBar> {
        let start = d(2023, 7, 17);
        (0..200u64)
            .map(|i| {
                let t = i as f64;
                let price = match ticker {
                    "AAA" => 100.0 + (t / 4.0).sin() * 2.0 + t * 0.1,
                    "BBB" => 50.0 + (t / 6.0).cos(),
                    "CCC" => 70.0 - t * 0.02 + (t / 3.0).sin(),
                    _ => 4.0,
                };
                PriceBar::flat(start + Days::new(i), price)
            })
            .collect()
    }

    fn fixture() -> InMemoryProvider {
        ["AAA", "BBB", "CCC", "^TNX"]
            .into_iter()
            .fold(InMemoryProvider::new(), |p, t| p.with_series(t, bars(t)))
    }

    fn served(ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ApiError> {
        let window = bars(ticker)
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(PriceSeries::new(ticker, start, end, window)?)
    }

    fn engine_over(prices: Arc<dyn PriceProvider>) -> ReportEngine {
        let rates = Arc::new(TickerYieldSource::new(Arc::new(fixture()), "^TNX"));
        ReportEngine::new(prices, rates, &AnalysisConfig::default())
    }

    fn request(pairs: &[(&str, &str)]) -> ReportRequest {
        ReportRequest {
            pairs: pairs.iter().map(|(l, s)| PairSpec::new(l, s).unwrap()).collect(),
            start_date: d(2023, 7, 17),
            as_of: d(2024, 1, 31),
        }
    }

    #[tokio::test]
    async fn produces_rows_for_every_pair_and_a_total() {
        let engine = engine_over(Arc::new(fixture()));
        let report = engine.run(&request(&[("AAA", "BBB"), ("CCC", "BBB")])).await.unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].long_ticker, "AAA");
        assert_eq!(report.rows[1].long_ticker, "CCC");
        assert_eq!(report.total.long_ticker, "Total Portfolio");
        assert_eq!(report.risk_free_rate_pct, Decimal::from(4));

        let mean_one_month = (report.rows[0].one_month + report.rows[1].one_month) / Decimal::from(2);
        assert!((report.total.one_month - mean_one_month).abs() <= Decimal::new(1, 2));
    }

    #[tokio::test]
    async fn report_keeps_the_submitted_start_date() {
        let engine = engine_over(Arc::new(fixture()));
        let saturday = ReportRequest {
            start_date: d(2023, 7, 22),
            ..request(&[("AAA", "BBB")])
        };
        let report = engine.run(&saturday).await.unwrap();
        assert_eq!(report.start_date, d(2023, 7, 22));
        assert_eq!(report.rows.len(), 1);
    }

    #[tokio::test]
    async fn identical_long_and_short_fail_with_undefined_ratio() {
        let engine = engine_over(Arc::new(fixture()));
        let err = engine.run(&request(&[("AAA", "AAA")])).await.unwrap_err();
        assert!(matches!(err, EngineError::Analytics(AnalyticsError::UndefinedRatio(_))));
    }

    #[tokio::test]
    async fn unknown_ticker_is_no_data_available() {
        let engine = engine_over(Arc::new(fixture()));
        let err = engine.run(&request(&[("AAA", "NOPE")])).await.unwrap_err();
        match err {
            EngineError::Analytics(AnalyticsError::NoDataAvailable { ticker, start, end }) => {
                assert_eq!(ticker, "NOPE");
                assert_eq!(start, d(2023, 7, 17));
                assert_eq!(end, d(2024, 1, 31));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn shared_ticker_is_fetched_once() {
        let mut prices = MockPrices::new();
        for ticker in ["AAA", "BBB", "CCC"] {
            prices
                .expect_fetch_history()
                .with(eq(ticker), always(), always())
                .times(1)
                .returning(|t, s, e| served(t, s, e));
        }

        let engine = engine_over(Arc::new(prices));
        let report = engine.run(&request(&[("AAA", "BBB"), ("CCC", "BBB")])).await.unwrap();
        assert_eq!(report.rows.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_submission() {
        let mut prices = MockPrices::new();
        prices.expect_fetch_history().times(1).returning(|_, _, _| {
            Err(ApiError::Provider {
                code: "Too Many Requests".to_string(),
                description: "rate limited".to_string(),
            })
        });

        let engine = engine_over(Arc::new(prices));
        let err = engine.run(&request(&[("AAA", "BBB")])).await.unwrap_err();
        assert!(matches!(err, EngineError::Api(ApiError::Provider { .. })));
    }

    #[tokio::test]
    async fn rejects_empty_and_inverted_requests() {
        let engine = engine_over(Arc::new(fixture()));

        let empty = request(&[]);
        assert!(matches!(engine.run(&empty).await, Err(EngineError::InvalidRequest(_))));

        let inverted = ReportRequest {
            as_of: d(2023, 1, 1),
            ..request(&[("AAA", "BBB")])
        };
        assert!(matches!(engine.run(&inverted).await, Err(EngineError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn rejects_more_pairs_than_the_cap_before_fetching() {
        // Any fetch would panic: the mock has no expectations.
        let engine = engine_over(Arc::new(MockPrices::new()));
        let too_many = request(&vec![("AAA", "BBB"); MAX_PAIRS + 1]);
        match engine.run(&too_many).await {
            Err(EngineError::InvalidRequest(message)) => assert!(message.contains("at most 50")),
            other => panic!("unexpected result: {other:?}"),
        }

        let at_cap = request(&vec![("AAA", "BBB"); MAX_PAIRS]);
        assert!(at_cap.validate().is_ok());
    }
}
