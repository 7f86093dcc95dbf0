use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalysisConfig, CliOverrides, Config, LoggingConfig, ProviderConfig, ReportConfig,
    ServerConfig,
};

/// Prefix for environment overrides, e.g. `PAIRLENS__SERVER__BIND_ADDR`.
const ENV_PREFIX: &str = "PAIRLENS";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` (optional),
/// then `PAIRLENS__SECTION__KEY` environment variables. The result is validated
/// before being returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects settings that would make every computation fail.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analysis.trading_days_per_year == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.trading_days_per_year must be greater than zero".to_string(),
        ));
    }
    if config.analysis.risk_free_ticker.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "analysis.risk_free_ticker must not be empty".to_string(),
        ));
    }
    if config.provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "provider.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.report.output_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "report.output_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::PriceField;

    fn from_toml(text: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<Config>()
            .unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.analysis.trading_days_per_year, 252);
        assert_eq!(config.analysis.risk_free_ticker, "^TNX");
        assert_eq!(config.report.output_path, Path::new("stock_returns.html"));
        assert_eq!(
            config.report.default_start_date,
            NaiveDate::from_ymd_opt(2023, 7, 17).unwrap()
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = from_toml(
            r#"
            [analysis]
            price_field = "close"

            [report]
            default_start_date = "2024-01-02"
            "#,
        );
        assert_eq!(config.analysis.price_field, PriceField::Close);
        assert_eq!(config.analysis.trading_days_per_year, 252);
        assert_eq!(config.report.default_start_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(config.provider.timeout_secs, 15);
    }

    #[test]
    fn validation_rejects_zero_trading_days() {
        let config = from_toml("[analysis]\ntrading_days_per_year = 0\n");
        assert!(matches!(validate(&config), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn overrides_replace_selected_fields() {
        let mut config = Config::default();
        config.apply_overrides(&CliOverrides {
            log_level: Some("debug".to_string()),
            output: None,
        });
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.report.output_path, Path::new("stock_returns.html"));
    }
}
