use serde::{Deserialize, Serialize};
use std::fmt;

/// Which price column of a bar feeds every return computation in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Close,
    #[default]
    AdjustedClose,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Close => write!(f, "Close"),
            PriceField::AdjustedClose => write!(f, "Adjusted Close"),
        }
    }
}

/// The fixed set of horizons a `PeriodMetrics` value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    OneMonth,
    ThreeMonths,
    OneYear,
    Cagr,
}

impl Horizon {
    /// Human-readable label, as shown in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::OneMonth => "One Month",
            Horizon::ThreeMonths => "Three Months",
            Horizon::OneYear => "One Year",
            Horizon::Cagr => "CAGR",
        }
    }

    /// Calendar-day offset from the resolved start date.
    ///
    /// CAGR is measured over the one-year window.
    pub fn calendar_days(&self) -> i64 {
        match self {
            Horizon::OneMonth => 30,
            Horizon::ThreeMonths => 90,
            Horizon::OneYear | Horizon::Cagr => 365,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
