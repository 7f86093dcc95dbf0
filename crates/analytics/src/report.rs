use crate::error::AnalyticsError;
use crate::pairs::{PairAnalysis, PortfolioAnalysis};
use chrono::NaiveDate;
use core_types::{PeriodMetrics, PriceField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column headers of the exported table, in display order.
pub const COLUMNS: [&str; 9] = [
    "Long Ticker",
    "Short Ticker",
    "Difference (One Month)",
    "Difference (Three Months)",
    "Difference (One Year)",
    "Difference (CAGR)",
    "Pair Volatility",
    "Max Drawdown",
    "Sharpe Ratio",
];

/// Label of the aggregate row.
pub const TOTAL_LABEL: &str = "Total Portfolio";

/// One line of the report. Percentages are in percent, all values rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub long_ticker: String,
    pub short_ticker: String,
    pub one_month: Decimal,
    pub three_months: Decimal,
    pub one_year: Decimal,
    pub cagr: Decimal,
    pub volatility: Decimal,
    pub max_drawdown: Decimal,
    pub sharpe_ratio: Decimal,
}

/// The standardized result of one submission.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for the HTML export, the terminal table and the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub start_date: NaiveDate,
    pub as_of: NaiveDate,
    pub price_field: PriceField,
    /// Average risk-free yield over the window, in percent.
    pub risk_free_rate_pct: Decimal,
    pub rows: Vec<ReportRow>,
    pub total: ReportRow,
}

/// Rounds to 2 dp from the exact binary value, as `{:.2}` prints it.
fn to_cell(metric: &str, value: f64) -> Result<Decimal, AnalyticsError> {
    if !value.is_finite() {
        return Err(AnalyticsError::NonFinite(metric.to_string()));
    }
    format!("{:.2}", value)
        .parse::<Decimal>()
        .map_err(|_| AnalyticsError::NonFinite(metric.to_string()))
}

impl ReportRow {
    fn build(
        long_ticker: &str,
        short_ticker: &str,
        difference: &PeriodMetrics,
        volatility: f64,
        max_drawdown: f64,
        sharpe_ratio: f64,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            long_ticker: long_ticker.to_string(),
            short_ticker: short_ticker.to_string(),
            one_month: to_cell("One Month", difference.one_month)?,
            three_months: to_cell("Three Months", difference.three_months)?,
            one_year: to_cell("One Year", difference.one_year)?,
            cagr: to_cell("CAGR", difference.cagr)?,
            volatility: to_cell("Pair Volatility", volatility)?,
            max_drawdown: to_cell("Max Drawdown", max_drawdown)?,
            sharpe_ratio: to_cell("Sharpe Ratio", sharpe_ratio)?,
        })
    }

    pub fn from_pair(pair: &PairAnalysis) -> Result<Self, AnalyticsError> {
        Self::build(
            &pair.pair.long,
            &pair.pair.short,
            &pair.difference,
            pair.volatility,
            pair.max_drawdown,
            pair.sharpe_ratio,
        )
    }

    pub fn from_portfolio(portfolio: &PortfolioAnalysis) -> Result<Self, AnalyticsError> {
        Self::build(
            TOTAL_LABEL,
            "",
            &portfolio.average_difference,
            portfolio.volatility,
            portfolio.max_drawdown,
            portfolio.sharpe_ratio,
        )
    }

    /// Display strings in `COLUMNS` order.
    pub fn cells(&self) -> [String; 9] {
        [
            self.long_ticker.clone(),
            self.short_ticker.clone(),
            format!("{:.2}%", self.one_month),
            format!("{:.2}%", self.three_months),
            format!("{:.2}%", self.one_year),
            format!("{:.2}%", self.cagr),
            format!("{:.2}%", self.volatility),
            format!("{:.2}%", self.max_drawdown),
            format!("{:.2}", self.sharpe_ratio),
        ]
    }
}

impl PortfolioReport {
    pub fn new(
        start_date: NaiveDate,
        as_of: NaiveDate,
        price_field: PriceField,
        risk_free_rate: f64,
        pairs: &[PairAnalysis],
        portfolio: &PortfolioAnalysis,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            start_date,
            as_of,
            price_field,
            risk_free_rate_pct: to_cell("Risk-Free Rate", risk_free_rate * 100.0)?,
            rows: pairs.iter().map(ReportRow::from_pair).collect::<Result<_, _>>()?,
            total: ReportRow::from_portfolio(portfolio)?,
        })
    }

    /// Pair rows followed by the total row.
    pub fn all_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().chain(std::iter::once(&self.total))
    }
}
