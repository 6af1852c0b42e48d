//! Runner configuration

use relay_engine::{BrokerConfig, ConfigError};
use relay_venue::requests::CHART_TICKS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything the `relay` binary needs, loaded from one JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub broker: BrokerConfig,
    /// Account number queries and orders run against
    pub account: String,
    /// Codes to load quotes and charts for at startup
    pub watchlist: Vec<String>,
    pub chart: ChartConfig,
    /// Reply latency of the simulated venue
    pub simulator_latency_ms: u64,
    /// How long the startup sequence may take in total
    pub startup_timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            account: "8000000011".to_string(),
            watchlist: vec!["005930".to_string(), "000660".to_string()],
            chart: ChartConfig::default(),
            simulator_latency_ms: 50,
            startup_timeout_ms: 120_000,
        }
    }
}

/// Minute chart fetch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub tick: u32,
    pub adjusted: bool,
    /// Window start, in days before today (0 = since midnight)
    pub lookback_days: i64,
    /// Stop after this many candles
    pub page_cap: Option<usize>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            tick: 1,
            adjusted: true,
            lookback_days: 1,
            page_cap: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.broker.validate()?;
        if self.account.trim().is_empty() {
            return Err(ConfigError::Invalid("account must be set".to_string()));
        }
        if !CHART_TICKS.contains(&self.chart.tick) {
            return Err(ConfigError::Invalid(format!(
                "chart.tick must be one of {CHART_TICKS:?}, got {}",
                self.chart.tick
            )));
        }
        if self.chart.lookback_days < 0 {
            return Err(ConfigError::Invalid(
                "chart.lookback_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn simulator_latency(&self) -> Duration {
        Duration::from_millis(self.simulator_latency_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}
