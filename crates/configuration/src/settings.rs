use chrono::NaiveDate;
use core_types::PriceField;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `config.toml` still yields a usable setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Where the web front-end listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

/// Settings for the market data HTTP client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the chart endpoint; the ticker is appended as a path segment.
    pub base_url: String,
    pub user_agent: String,
    /// Upper bound for a single history download.
    pub timeout_secs: u64,
}

/// Parameters that shape the return and risk computations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Preferred price column. Falls back to `close` for a whole request when any
    /// fetched series lacks adjusted closes.
    pub price_field: PriceField,
    /// Ticker whose closes are treated as an annualized yield in percent.
    pub risk_free_ticker: String,
    /// Annualization factor for volatility and Sharpe.
    pub trading_days_per_year: u32,
}

/// Settings for the exported report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Fixed export location, overwritten by every run.
    pub output_path: PathBuf,
    /// Start date pre-filled in the input form.
    pub default_start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct CliOverrides {
    /// Log filter directive (e.g. "debug" or "engine=trace").
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub log_level: Option<String>,

    /// Path of the exported HTML report.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub output: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            price_field: PriceField::AdjustedClose,
            risk_free_ticker: "^TNX".to_string(),
            trading_days_per_year: 252,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("stock_returns.html"),
            default_start_date: NaiveDate::from_ymd_opt(2023, 7, 17).unwrap_or_default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(output) = &overrides.output {
            self.report.output_path = output.clone();
        }
    }
}
