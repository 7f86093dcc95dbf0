use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::PriceSeries;

/// Maps a calendar date onto the index of a trading day present in `series`.
///
/// A target after the last bar clamps to the last bar. Otherwise the first bar dated on
/// or after the target is chosen, so weekends and holidays roll forward to the next
/// session and the result never lies past the final bar.
pub fn resolve_trading_day(series: &PriceSeries, target: NaiveDate) -> Result<usize, AnalyticsError> {
    let last = series.len().checked_sub(1).ok_or_else(|| no_data(series))?;
    Ok(series.first_index_on_or_after(target).unwrap_or(last))
}

/// Same as `resolve_trading_day`, returning the resolved date.
pub fn resolve_trading_date(series: &PriceSeries, target: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    let idx = resolve_trading_day(series, target)?;
    series.date_at(idx).ok_or_else(|| no_data(series))
}

pub(crate) fn no_data(series: &PriceSeries) -> AnalyticsError {
    let (start, end) = series.requested_window();
    AnalyticsError::NoDataAvailable {
        ticker: series.ticker().to_string(),
        start,
        end,
    }
}
