use crate::error::AnalyticsError;
use crate::returns::{daily_returns, period_metrics};
use crate::risk::{max_drawdown, mean, sharpe_ratio};
use chrono::NaiveDate;
use core_types::{PairSpec, PeriodMetrics, PriceField, PriceSeries, ReturnSeries};
use std::cmp::Ordering;

/// Everything computed for one long/short pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairAnalysis {
    pub pair: PairSpec,
    pub long_metrics: PeriodMetrics,
    pub short_metrics: PeriodMetrics,
    /// Long minus short, per horizon.
    pub difference: PeriodMetrics,
    pub spread: ReturnSeries,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

/// The equal-weighted roll-up of all pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioAnalysis {
    pub average_difference: PeriodMetrics,
    /// Dates shared by every pair's spread series.
    pub common_dates: Vec<NaiveDate>,
    /// Per-date mean of the aligned spreads.
    pub returns: Vec<f64>,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

/// Long return minus short return on the dates both series share.
pub fn spread_series(long: &ReturnSeries, short: &ReturnSeries) -> Result<ReturnSeries, AnalyticsError> {
    let mut dates = Vec::new();
    let mut values = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < long.len() && j < short.len() {
        match long.dates[i].cmp(&short.dates[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(long.dates[i]);
                values.push(long.values[i] - short.values[j]);
                i += 1;
                j += 1;
            }
        }
    }

    if dates.is_empty() {
        return Err(AnalyticsError::InsufficientOverlap(format!(
            "'{}' and '{}' share no trading dates",
            long.name, short.name
        )));
    }

    Ok(ReturnSeries::new(format!("{}-{}", long.name, short.name), dates, values)?)
}

/// Restricts every series to the dates present in all of them.
///
/// Returns the shared dates and one column of values per input series.
pub fn align(series: &[ReturnSeries]) -> Result<(Vec<NaiveDate>, Vec<Vec<f64>>), AnalyticsError> {
    let (first, rest) = series.split_first().ok_or_else(|| {
        AnalyticsError::NotEnoughData("no series to align".to_string())
    })?;

    let common: Vec<NaiveDate> = first
        .dates
        .iter()
        .copied()
        .filter(|date| rest.iter().all(|s| s.dates.binary_search(date).is_ok()))
        .collect();

    if common.is_empty() {
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        return Err(AnalyticsError::InsufficientOverlap(format!(
            "spread series [{}] share no common dates",
            names.join(", ")
        )));
    }

    let columns = series
        .iter()
        .map(|s| {
            common
                .iter()
                .map(|date| s.value_on(*date).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok((common, columns))
}

/// Sample covariance matrix of equally long columns.
pub fn covariance_matrix(columns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, AnalyticsError> {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    if rows < 2 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "covariance needs at least two aligned observations, got {}",
            rows
        )));
    }

    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
    let n = columns.len();
    let mut cov = vec![vec![0.0; n]; n];
    for a in 0..n {
        for b in a..n {
            let sum: f64 = (0..rows)
                .map(|t| (columns[a][t] - means[a]) * (columns[b][t] - means[b]))
                .sum();
            let value = sum / (rows - 1) as f64;
            cov[a][b] = value;
            cov[b][a] = value;
        }
    }
    Ok(cov)
}

/// `sqrt(wᵀ·Σ·w)` annualized, in percent.
pub fn portfolio_volatility(cov: &[Vec<f64>], weights: &[f64], periods_per_year: u32) -> f64 {
    let variance: f64 = weights
        .iter()
        .enumerate()
        .map(|(a, wa)| {
            weights
                .iter()
                .enumerate()
                .map(|(b, wb)| wa * cov[a][b] * wb)
                .sum::<f64>()
        })
        .sum();
    // Rounding can leave a perfectly hedged book a hair below zero.
    variance.max(0.0).sqrt() * (periods_per_year as f64).sqrt() * 100.0
}

/// Equal-weight volatility and per-date mean returns of aligned columns.
fn equal_weight(columns: &[Vec<f64>], periods_per_year: u32) -> Result<(f64, Vec<f64>), AnalyticsError> {
    let cov = covariance_matrix(columns)?;
    let weights = vec![1.0 / columns.len() as f64; columns.len()];
    let volatility = portfolio_volatility(&cov, &weights, periods_per_year);

    let rows = columns[0].len();
    let returns = (0..rows)
        .map(|t| columns.iter().map(|c| c[t]).sum::<f64>() / columns.len() as f64)
        .collect();
    Ok((volatility, returns))
}

/// Computes horizon differences and spread risk for one pair.
pub fn analyze_pair(
    pair: &PairSpec,
    long: &PriceSeries,
    short: &PriceSeries,
    field: PriceField,
    start_date: NaiveDate,
    risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<PairAnalysis, AnalyticsError> {
    let long_metrics = period_metrics(long, field, start_date)?;
    let short_metrics = period_metrics(short, field, start_date)?;
    let difference = long_metrics.difference(&short_metrics);

    let spread = spread_series(&daily_returns(long, field)?, &daily_returns(short, field)?)?;
    let (volatility, _) = equal_weight(std::slice::from_ref(&spread.values), periods_per_year)?;
    let max_drawdown = max_drawdown(&spread.values);
    let sharpe_ratio = sharpe_ratio(&spread.values, risk_free_rate, periods_per_year)?;

    tracing::debug!(
        pair = %pair,
        observations = spread.len(),
        volatility,
        max_drawdown,
        sharpe_ratio,
        "Analyzed pair."
    );

    Ok(PairAnalysis {
        pair: pair.clone(),
        long_metrics,
        short_metrics,
        difference,
        spread,
        volatility,
        max_drawdown,
        sharpe_ratio,
    })
}

/// Rolls every pair into one equal-weighted portfolio.
pub fn aggregate(
    pairs: &[PairAnalysis],
    risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<PortfolioAnalysis, AnalyticsError> {
    let differences: Vec<PeriodMetrics> = pairs.iter().map(|p| p.difference).collect();
    let average_difference = PeriodMetrics::mean(&differences)
        .ok_or_else(|| AnalyticsError::NotEnoughData("portfolio has no pairs".to_string()))?;

    let spreads: Vec<ReturnSeries> = pairs.iter().map(|p| p.spread.clone()).collect();
    let (common_dates, columns) = align(&spreads)?;
    let (volatility, returns) = equal_weight(&columns, periods_per_year)?;

    let max_drawdown = max_drawdown(&returns);
    let sharpe_ratio = sharpe_ratio(&returns, risk_free_rate, periods_per_year)?;

    tracing::debug!(
        pairs = pairs.len(),
        observations = common_dates.len(),
        volatility,
        "Aggregated portfolio."
    );

    Ok(PortfolioAnalysis {
        average_difference,
        common_dates,
        returns,
        volatility,
        max_drawdown,
        sharpe_ratio,
    })
}
