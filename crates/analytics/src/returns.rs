use crate::calendar::{no_data, resolve_trading_day};
use crate::error::AnalyticsError;
use crate::risk::CALENDAR_DAYS_PER_YEAR;
use chrono::{Days, NaiveDate};
use core_types::{Horizon, PeriodMetrics, PriceField, PriceSeries, ReturnSeries};

/// Picks the price column for a whole request.
///
/// The preferred field is honoured only when every series can supply it, so a
/// request never mixes adjusted and raw closes across tickers.
pub fn select_price_field(preferred: PriceField, series: &[&PriceSeries]) -> PriceField {
    match preferred {
        PriceField::AdjustedClose if series.iter().all(|s| s.has_adjusted_close()) => {
            PriceField::AdjustedClose
        }
        PriceField::AdjustedClose => {
            tracing::warn!("Adjusted closes missing for at least one ticker; using raw closes.");
            PriceField::Close
        }
        PriceField::Close => PriceField::Close,
    }
}

/// Percentage change between two bars of the same series.
pub fn percent_change(
    series: &PriceSeries,
    field: PriceField,
    start_idx: usize,
    end_idx: usize,
) -> Result<f64, AnalyticsError> {
    let start_price = series.price_at(start_idx, field).ok_or_else(|| no_data(series))?;
    let end_price = series.price_at(end_idx, field).ok_or_else(|| no_data(series))?;

    if start_price == 0.0 {
        return Err(AnalyticsError::DivisionByZero(format!(
            "{} return",
            series.ticker()
        )));
    }

    Ok((end_price - start_price) / start_price * 100.0)
}

/// Fractional close-to-close returns. The first bar has no prior close and is dropped.
pub fn daily_returns(series: &PriceSeries, field: PriceField) -> Result<ReturnSeries, AnalyticsError> {
    let bars = series.bars();
    let mut dates = Vec::with_capacity(bars.len().saturating_sub(1));
    let mut values = Vec::with_capacity(bars.len().saturating_sub(1));

    for w in bars.windows(2) {
        let prev = w[0].price(field);
        if prev == 0.0 {
            return Err(AnalyticsError::DivisionByZero(format!(
                "{} daily return on {}",
                series.ticker(),
                w[1].date
            )));
        }
        dates.push(w[1].date);
        values.push((w[1].price(field) - prev) / prev);
    }

    Ok(ReturnSeries::new(series.ticker(), dates, values)?)
}

/// Compound annual growth rate in percent over `days_elapsed` calendar days.
pub fn cagr(start_price: f64, end_price: f64, days_elapsed: i64) -> Result<f64, AnalyticsError> {
    if days_elapsed <= 0 {
        return Err(AnalyticsError::DivisionByZero(
            "CAGR (no calendar days elapsed)".to_string(),
        ));
    }
    if start_price == 0.0 {
        return Err(AnalyticsError::DivisionByZero("CAGR".to_string()));
    }

    let growth = end_price / start_price;
    let value = (growth.powf(CALENDAR_DAYS_PER_YEAR / days_elapsed as f64) - 1.0) * 100.0;
    if !value.is_finite() {
        return Err(AnalyticsError::NonFinite("CAGR".to_string()));
    }
    Ok(value)
}

/// Computes the per-horizon changes of one ticker from `start_date`.
///
/// The start date is first rolled to a trading day; each horizon end is the resolved
/// trading day that many calendar days later, clamped to the last available bar.
pub fn period_metrics(
    series: &PriceSeries,
    field: PriceField,
    start_date: NaiveDate,
) -> Result<PeriodMetrics, AnalyticsError> {
    let start_idx = resolve_trading_day(series, start_date)?;
    let start_day = series.date_at(start_idx).ok_or_else(|| no_data(series))?;

    let horizon_end = |horizon: Horizon| -> Result<usize, AnalyticsError> {
        match start_day.checked_add_days(Days::new(horizon.calendar_days() as u64)) {
            Some(target) => resolve_trading_day(series, target),
            None => Ok(series.len() - 1),
        }
    };

    let month_idx = horizon_end(Horizon::OneMonth)?;
    let quarter_idx = horizon_end(Horizon::ThreeMonths)?;
    let year_idx = horizon_end(Horizon::OneYear)?;

    let year_day = series.date_at(year_idx).ok_or_else(|| no_data(series))?;
    let start_price = series.price_at(start_idx, field).ok_or_else(|| no_data(series))?;
    let year_price = series.price_at(year_idx, field).ok_or_else(|| no_data(series))?;

    let metrics = PeriodMetrics {
        one_month: percent_change(series, field, start_idx, month_idx)?,
        three_months: percent_change(series, field, start_idx, quarter_idx)?,
        one_year: percent_change(series, field, start_idx, year_idx)?,
        cagr: cagr(start_price, year_price, (year_day - start_day).num_days())?,
    };

    tracing::debug!(
        ticker = series.ticker(),
        %start_day,
        %year_day,
        one_month = metrics.one_month,
        one_year = metrics.one_year,
        "Computed period metrics."
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core_types::PriceBar;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Daily bars (weekends included) with prices produced by `f(day_offset)`.
    fn daily(ticker: &str, start: NaiveDate, days: u64, f: impl Fn(u64) -> f64) -> PriceSeries {
        let bars = (0..days).map(|i| PriceBar::flat(start + Days::new(i), f(i))).collect();
        PriceSeries::new(ticker, start, start + Days::new(days), bars).unwrap()
    }

    #[test]
    fn change_on_same_day_is_exactly_zero() {
        let series = daily("A", d(2024, 1, 1), 10, |i| 100.0 + i as f64 * 0.37);
        for idx in 0..series.len() {
            assert_eq!(percent_change(&series, PriceField::Close, idx, idx).unwrap(), 0.0);
        }
    }

    #[test]
    fn zero_start_price_is_division_by_zero() {
        let series = daily("ZERO", d(2024, 1, 1), 3, |i| i as f64);
        let err = percent_change(&series, PriceField::Close, 0, 2).unwrap_err();
        assert!(matches!(err, AnalyticsError::DivisionByZero(_)));
        assert!(matches!(
            daily_returns(&series, PriceField::Close),
            Err(AnalyticsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn daily_returns_drop_first_bar() {
        let series = daily("A", d(2024, 1, 1), 4, |i| [100.0, 110.0, 99.0, 99.0][i as usize]);
        let returns = daily_returns(&series, PriceField::Close).unwrap();
        assert_eq!(returns.len(), 3);
        assert_eq!(returns.dates[0], d(2024, 1, 2));
        assert_relative_eq!(returns.values[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.values[1], -0.10, epsilon = 1e-12);
        assert_eq!(returns.values[2], 0.0);
    }

    #[test]
    fn one_month_gain_of_ten_percent() {
        let rising = daily("A", d(2024, 1, 1), 400, |i| if i < 30 { 100.0 } else { 110.0 });
        let flat = daily("B", d(2024, 1, 1), 400, |_| 50.0);

        let a = period_metrics(&rising, PriceField::Close, d(2024, 1, 1)).unwrap();
        let b = period_metrics(&flat, PriceField::Close, d(2024, 1, 1)).unwrap();
        let diff = a.difference(&b);

        assert_relative_eq!(a.one_month, 10.0, epsilon = 1e-9);
        assert_eq!(b.one_month, 0.0);
        assert_relative_eq!(diff.one_month, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn one_year_clamps_to_last_bar_and_cagr_annualizes() {
        // 100 -> 121 over 182 days of data; the one-year horizon clamps to the last bar.
        let series = daily("A", d(2023, 1, 1), 183, |i| if i == 182 { 121.0 } else { 100.0 });
        let metrics = period_metrics(&series, PriceField::Close, d(2023, 1, 1)).unwrap();

        assert_relative_eq!(metrics.one_year, 21.0, epsilon = 1e-9);
        let expected = (1.21f64.powf(365.25 / 182.0) - 1.0) * 100.0;
        assert_relative_eq!(metrics.cagr, expected, epsilon = 1e-9);
    }

    #[test]
    fn cagr_over_a_full_year_matches_simple_growth() {
        assert_relative_eq!(cagr(100.0, 110.0, 365).unwrap(), (1.1f64.powf(365.25 / 365.0) - 1.0) * 100.0, epsilon = 1e-9);
        assert!(matches!(cagr(100.0, 110.0, 0), Err(AnalyticsError::DivisionByZero(_))));
    }

    #[test]
    fn adjusted_close_is_used_only_when_every_series_has_it() {
        let full = daily("A", d(2024, 1, 1), 3, |_| 1.0);
        let mut bars = full.bars().to_vec();
        bars[1].adj_close = None;
        let partial = PriceSeries::new("B", d(2024, 1, 1), d(2024, 1, 4), bars).unwrap();

        assert_eq!(select_price_field(PriceField::AdjustedClose, &[&full]), PriceField::AdjustedClose);
        assert_eq!(select_price_field(PriceField::AdjustedClose, &[&full, &partial]), PriceField::Close);
        assert_eq!(select_price_field(PriceField::Close, &[&full]), PriceField::Close);
    }
}
