//! Dashboard configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock dashboard: `AAPL, MSFT, GOOGL` over the last 30 days, y-axis 0..500.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::chart::YDomain;
use crate::ticker::NameTable;

/// Upper bound for `provider.max_retries`.
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration shared by the TUI and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Initial contents of the ticker text field.
    pub default_tickers: String,
    /// Look-back window used for the initial date range.
    pub lookback_days: u32,
    pub y_min: f64,
    pub y_max: f64,
    /// Upper bound of the y-range slider.
    pub slider_max: f64,
    /// Extra or overriding symbol → display-name entries.
    pub names: BTreeMap<String, String>,
    pub provider: ProviderSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_tickers: "AAPL, MSFT, GOOGL".to_string(),
            lookback_days: 30,
            y_min: 0.0,
            y_max: 500.0,
            slider_max: 4000.0,
            names: BTreeMap::new(),
            provider: ProviderSettings::default(),
        }
    }
}

/// HTTP settings for the Yahoo provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: String,
    pub breaker_cooldown_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            breaker_cooldown_secs: 30 * 60,
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

impl DashboardConfig {
    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=50).contains(&self.lookback_days) {
            return Err(ConfigError::Invalid(format!(
                "lookback_days must be within 1..=50, got {}",
                self.lookback_days
            )));
        }
        if self.provider.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "provider.max_retries must be at most {MAX_RETRIES}, got {}",
                self.provider.max_retries
            )));
        }
        if self.slider_max <= 0.0 {
            return Err(ConfigError::Invalid("slider_max must be positive".into()));
        }
        if self.y_min < 0.0 || self.y_max > self.slider_max {
            return Err(ConfigError::Invalid(format!(
                "y range [{}, {}] is outside the slider bounds [0, {}]",
                self.y_min, self.y_max, self.slider_max
            )));
        }
        YDomain::new(self.y_min, self.y_max)
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Initial y-axis domain. Falls back to the stock domain if the
    /// configured one is inverted (only reachable when built by hand).
    pub fn y_domain(&self) -> YDomain {
        YDomain::new(self.y_min, self.y_max).unwrap_or_default()
    }

    /// The built-in name table extended with the configured entries.
    pub fn name_table(&self) -> NameTable {
        NameTable::with_overrides(self.names.clone())
    }
}
