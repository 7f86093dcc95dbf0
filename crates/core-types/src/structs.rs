use crate::enums::{Horizon, PriceField};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One daily OHLC bar for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Split/dividend adjusted close, when the provider supplies one.
    pub adj_close: Option<f64>,
}

impl PriceBar {
    /// Convenience constructor for a bar where every price is the same value.
    pub fn flat(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            adj_close: Some(price),
        }
    }

    /// Returns the price for the requested field.
    ///
    /// Falls back to the raw close when no adjusted close was supplied; callers that
    /// need consistency across a request pick the field with `PriceSeries::has_adjusted_close`.
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjustedClose => self.adj_close.unwrap_or(self.close),
        }
    }
}

/// The daily price history of one ticker over a requested calendar window.
///
/// Bars are ordered by strictly increasing date and only trading days are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    requested_start: NaiveDate,
    requested_end: NaiveDate,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(
        ticker: impl Into<String>,
        requested_start: NaiveDate,
        requested_end: NaiveDate,
        bars: Vec<PriceBar>,
    ) -> Result<Self, CoreError> {
        let ticker = ticker.into();
        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::InvalidInput(
                format!("price series '{}'", ticker),
                format!("dates must be strictly increasing ({} then {})", w[0].date, w[1].date),
            ));
        }
        Ok(Self {
            ticker,
            requested_start,
            requested_end,
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// The calendar window that was asked of the provider.
    pub fn requested_window(&self) -> (NaiveDate, NaiveDate) {
        (self.requested_start, self.requested_end)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.bars.get(index).map(|b| b.date)
    }

    pub fn price_at(&self, index: usize, field: PriceField) -> Option<f64> {
        self.bars.get(index).map(|b| b.price(field))
    }

    /// Index of the first bar dated on or after `date`, if any.
    pub fn first_index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.date < date);
        (idx < self.bars.len()).then_some(idx)
    }

    /// True when every bar carries an adjusted close.
    pub fn has_adjusted_close(&self) -> bool {
        self.bars.iter().all(|b| b.adj_close.is_some())
    }
}

/// An ordered sequence of (date, fractional return) observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(CoreError::InvalidInput(
                format!("return series '{}'", name),
                format!("{} dates vs {} values", dates.len(), values.len()),
            ));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CoreError::InvalidInput(
                format!("return series '{}'", name),
                "dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }
}

/// A long/short ticker pair as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairSpec {
    pub long: String,
    pub short: String,
}

impl PairSpec {
    /// Builds a pair, trimming and upper-casing both symbols.
    pub fn new(long: &str, short: &str) -> Result<Self, CoreError> {
        let long = normalize_ticker(long, "long ticker")?;
        let short = normalize_ticker(short, "short ticker")?;
        Ok(Self { long, short })
    }
}

fn normalize_ticker(raw: &str, what: &str) -> Result<String, CoreError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(CoreError::InvalidInput(
            what.to_string(),
            "ticker must not be empty".to_string(),
        ));
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidInput(
            what.to_string(),
            format!("'{}' contains whitespace", ticker),
        ));
    }
    Ok(ticker)
}

/// Parses the `LONG:SHORT` notation used on the command line.
impl FromStr for PairSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (long, short) = s.split_once(':').ok_or_else(|| {
            CoreError::InvalidInput("pair".to_string(), format!("expected LONG:SHORT, got '{}'", s))
        })?;
        PairSpec::new(long, short)
    }
}

impl fmt::Display for PairSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.long, self.short)
    }
}

/// Percentage value for each `Horizon`, for one ticker or one pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub one_month: f64,
    pub three_months: f64,
    pub one_year: f64,
    pub cagr: f64,
}

impl PeriodMetrics {
    pub fn from_fn(mut f: impl FnMut(Horizon) -> f64) -> Self {
        Self {
            one_month: f(Horizon::OneMonth),
            three_months: f(Horizon::ThreeMonths),
            one_year: f(Horizon::OneYear),
            cagr: f(Horizon::Cagr),
        }
    }

    pub fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneMonth => self.one_month,
            Horizon::ThreeMonths => self.three_months,
            Horizon::OneYear => self.one_year,
            Horizon::Cagr => self.cagr,
        }
    }

    /// Long minus short, horizon by horizon.
    pub fn difference(&self, short: &PeriodMetrics) -> PeriodMetrics {
        PeriodMetrics::from_fn(|h| self.get(h) - short.get(h))
    }

    /// Equal-weighted mean of each horizon. `None` for an empty slice.
    pub fn mean(items: &[PeriodMetrics]) -> Option<PeriodMetrics> {
        if items.is_empty() {
            return None;
        }
        let n = items.len() as f64;
        Some(PeriodMetrics::from_fn(|h| {
            items.iter().map(|m| m.get(h)).sum::<f64>() / n
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_series_rejects_unordered_dates() {
        let bars = vec![PriceBar::flat(d(2024, 1, 3), 1.0), PriceBar::flat(d(2024, 1, 2), 1.0)];
        let err = PriceSeries::new("AAPL", d(2024, 1, 1), d(2024, 1, 5), bars).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn first_index_on_or_after_skips_gaps() {
        let bars = vec![PriceBar::flat(d(2024, 1, 5), 1.0), PriceBar::flat(d(2024, 1, 8), 2.0)];
        let series = PriceSeries::new("X", d(2024, 1, 1), d(2024, 1, 9), bars).unwrap();
        assert_eq!(series.first_index_on_or_after(d(2024, 1, 6)), Some(1));
        assert_eq!(series.first_index_on_or_after(d(2024, 1, 1)), Some(0));
        assert_eq!(series.first_index_on_or_after(d(2024, 1, 9)), None);
    }

    #[test]
    fn adjusted_price_falls_back_to_close() {
        let mut bar = PriceBar::flat(d(2024, 1, 2), 10.0);
        bar.adj_close = None;
        assert_eq!(bar.price(PriceField::AdjustedClose), 10.0);
        let series = PriceSeries::new("X", d(2024, 1, 1), d(2024, 1, 3), vec![bar]).unwrap();
        assert!(!series.has_adjusted_close());
    }

    #[test]
    fn pair_spec_parses_and_normalizes() {
        let pair: PairSpec = " aapl : msft ".parse().unwrap();
        assert_eq!(pair.long, "AAPL");
        assert_eq!(pair.short, "MSFT");
        assert!("AAPL".parse::<PairSpec>().is_err());
        assert!(PairSpec::new("", "MSFT").is_err());
    }

    #[test]
    fn period_metrics_difference_and_mean() {
        let a = PeriodMetrics { one_month: 10.0, three_months: 5.0, one_year: 1.0, cagr: 2.0 };
        let b = PeriodMetrics { one_month: 4.0, three_months: 5.0, one_year: -1.0, cagr: 0.0 };
        let diff = a.difference(&b);
        assert_eq!(diff.one_month, 6.0);
        assert_eq!(diff.one_year, 2.0);

        let mean = PeriodMetrics::mean(&[a, b]).unwrap();
        assert_eq!(mean.one_month, 7.0);
        assert_eq!(mean.get(Horizon::Cagr), 1.0);
        assert!(PeriodMetrics::mean(&[]).is_none());
    }

    #[test]
    fn price_field_uses_snake_case() {
        let json = serde_json::to_string(&PriceField::AdjustedClose).unwrap();
        assert_eq!(json, "\"adjusted_close\"");
    }
}
