//! # Pairlens Analytics Engine
//!
//! This crate holds the return and risk arithmetic behind the long/short pair report.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It depends only
//!   on `core-types`; price series and the risk-free rate are passed in as values.
//! - **Fail, Don't Guess:** every degenerate case (empty series, zero prices, zero
//!   variance, disjoint dates) is an `AnalyticsError`, never a NaN in the output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: turns fetched series for N pairs into a `PortfolioReport`.
//! - `calendar`, `returns`, `risk`, `pairs`: the individual building blocks.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod calendar;
pub mod engine;
pub mod error;
pub mod pairs;
pub mod report;
pub mod returns;
pub mod risk;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, PairInput};
pub use error::AnalyticsError;
pub use report::{PortfolioReport, ReportRow, COLUMNS};
