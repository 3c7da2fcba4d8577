//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use xo_mm::QuoteConfig;
use xo_signal::SignalConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "XO_CONFIG";

/// Config file used when neither the CLI nor `XO_CONFIG` names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Strategy driving trade decisions (only "trader_xo").
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    /// Bar interval passed to the indicator source (e.g. "5m", "1h").
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Assets to evaluate, in output order. Empty = every asset in the
    /// market data file.
    #[serde(default)]
    pub assets: Vec<String>,
    /// Signal engine configuration.
    #[serde(default)]
    pub signal: SignalConfig,
    /// Market making configuration.
    #[serde(default)]
    pub quotes: QuoteConfig,
    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_strategy_name() -> String {
    crate::integration::TRADER_XO.to_string()
}

fn default_interval() -> String {
    "5m".to_string()
}

/// Telemetry configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Print Prometheus metrics to stderr before exit.
    #[serde(default)]
    pub dump_metrics: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy_name: default_strategy_name(),
            interval: default_interval(),
            assets: Vec::new(),
            signal: SignalConfig::default(),
            quotes: QuoteConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file or use defaults.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> AppResult<()> {
        if self.interval.trim().is_empty() {
            return Err(AppError::Config("interval must not be empty".to_string()));
        }
        self.signal.validate()?;
        self.quotes.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.strategy_name, "trader_xo");
        assert_eq!(config.interval, "5m");
        assert!(config.assets.is_empty());
        assert!(!config.telemetry.dump_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
interval = "1h"
assets = ["BTC", "ETH"]

[signal]
fast_ema_period = 9
ma_filter_type = "None"

[quotes]
num_levels = 2
"#;
        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.interval, "1h");
        assert_eq!(config.assets, vec!["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(config.signal.fast_ema_period, 9);
        assert_eq!(config.signal.slow_ema_period, 25);
        assert!(!config.signal.ma_filter_type.is_enabled());
        assert_eq!(config.quotes.num_levels, 2);
        assert_eq!(config.strategy_name, "trader_xo");
    }

    #[test]
    fn test_config_rejects_invalid_section() {
        let toml_str = r#"
[quotes]
num_levels = 0
"#;
        assert!(matches!(
            AppConfig::from_toml(toml_str),
            Err(AppError::Quote(_))
        ));

        let toml_str = r#"
[signal]
slow_ema_period = 0
"#;
        assert!(matches!(
            AppConfig::from_toml(toml_str),
            Err(AppError::SignalConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_toml() {
        let result = AppConfig::from_toml("signal = 3");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::from_file("/nonexistent/xo-bot.toml");
        assert!(
            matches!(result, Err(AppError::Config(ref msg)) if msg.starts_with("Failed to read config"))
        );
    }

    #[test]
    fn test_shipped_default_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = AppConfig::from_file(path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("strategy_name"));
        assert!(toml_str.contains("[signal]"));
        assert!(toml_str.contains("[quotes]"));
    }
}
