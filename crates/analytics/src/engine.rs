use crate::error::AnalyticsError;
use crate::pairs::{aggregate, analyze_pair};
use crate::report::PortfolioReport;
use crate::returns::select_price_field;
use crate::risk::average_risk_free_rate;
use chrono::NaiveDate;
use core_types::{PairSpec, PriceField, PriceSeries};

/// The fetched histories for one pair.
#[derive(Debug, Clone, Copy)]
pub struct PairInput<'a> {
    pub pair: &'a PairSpec,
    pub long: &'a PriceSeries,
    pub short: &'a PriceSeries,
}

/// A stateless calculator turning fetched price histories into a `PortfolioReport`.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    periods_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(252)
    }
}

impl AnalyticsEngine {
    pub fn new(periods_per_year: u32) -> Self {
        Self { periods_per_year }
    }

    /// Annual risk-free rate as a fraction, from a percent-quoted yield series.
    pub fn risk_free_rate(&self, yields: &PriceSeries) -> Result<f64, AnalyticsError> {
        average_risk_free_rate(yields)
    }

    /// The main entry point for calculating the pair report.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The long and short histories of every submitted pair.
    /// * `preferred_field` - Price column to use when every series supports it.
    /// * `start_date` - The user's start date, before trading-day resolution.
    /// * `as_of` - The end of the fetched window.
    /// * `risk_free_rate` - Annual risk-free rate as a fraction.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PortfolioReport` or the first `AnalyticsError` hit;
    /// there is no partial report.
    pub fn analyze(
        &self,
        inputs: &[PairInput<'_>],
        preferred_field: PriceField,
        start_date: NaiveDate,
        as_of: NaiveDate,
        risk_free_rate: f64,
    ) -> Result<PortfolioReport, AnalyticsError> {
        if inputs.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "at least one pair is required".to_string(),
            ));
        }

        let all_series: Vec<&PriceSeries> = inputs.iter().flat_map(|i| [i.long, i.short]).collect();
        let field = select_price_field(preferred_field, &all_series);

        let pairs = inputs
            .iter()
            .map(|input| {
                analyze_pair(
                    input.pair,
                    input.long,
                    input.short,
                    field,
                    start_date,
                    risk_free_rate,
                    self.periods_per_year,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let portfolio = aggregate(&pairs, risk_free_rate, self.periods_per_year)?;

        tracing::info!(
            pairs = pairs.len(),
            %field,
            volatility = portfolio.volatility,
            sharpe = portfolio.sharpe_ratio,
            "Portfolio analysis complete."
        );

        PortfolioReport::new(start_date, as_of, field, risk_free_rate, &pairs, &portfolio)
    }
}
