use crate::calendar::no_data;
use crate::error::AnalyticsError;
use core_types::{PriceField, PriceSeries};

/// Average calendar year length used to annualize growth.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

/// Standard deviations at or below this are treated as zero variance.
const ZERO_VARIANCE: f64 = 1e-12;

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64], metric: &str) -> Result<f64, AnalyticsError> {
    if values.len() < 2 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "{} needs at least two returns, got {}",
            metric,
            values.len()
        )));
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|r| {
            let diff = r - m;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Annualized volatility of per-period returns, in percent.
pub fn annualized_volatility(returns: &[f64], periods_per_year: u32) -> Result<f64, AnalyticsError> {
    let std_dev = sample_std_dev(returns, "volatility")?;
    Ok(std_dev * (periods_per_year as f64).sqrt() * 100.0)
}

/// Deepest peak-to-trough decline of the compounded growth curve, in percent.
///
/// Always `<= 0`; an empty or never-declining curve yields `0`.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let drawdown = (equity - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst * 100.0
}

/// Annualized Sharpe ratio of per-period returns against an annual risk-free rate
/// expressed as a fraction.
pub fn sharpe_ratio(
    returns: &[f64],
    risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<f64, AnalyticsError> {
    let periods = periods_per_year as f64;
    let std_dev = sample_std_dev(returns, "Sharpe ratio")?;
    if std_dev <= ZERO_VARIANCE {
        return Err(AnalyticsError::UndefinedRatio("Sharpe".to_string()));
    }

    let annual_return = mean(returns) * periods;
    Ok((annual_return - risk_free_rate) / (std_dev * periods.sqrt()))
}

/// Mean of a percent-quoted yield series over every calendar day it spans, as a fraction.
///
/// Each quote is carried forward until the next one, so weekends and holidays take
/// the last known yield.
pub fn average_risk_free_rate(yields: &PriceSeries) -> Result<f64, AnalyticsError> {
    let bars = yields.bars();
    let last = bars.last().ok_or_else(|| no_data(yields))?;

    let mut weighted = 0.0_f64;
    let mut days = 0_i64;
    for w in bars.windows(2) {
        let span = (w[1].date - w[0].date).num_days();
        weighted += w[0].price(PriceField::Close) * span as f64;
        days += span;
    }
    weighted += last.price(PriceField::Close);
    days += 1;

    let rate = weighted / days as f64 / 100.0;
    tracing::debug!(ticker = yields.ticker(), days, rate, "Averaged risk-free yield.");
    Ok(rate)
}
