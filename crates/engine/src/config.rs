//! Broker configuration
//!
//! Loaded from JSON; every field has a default so `{}` is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Root configuration for the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Minimum spacing between two dispatches. The venue allows 5 calls/second.
    pub min_interval_ms: u64,

    /// How long a dispatched request may wait for its reply
    pub request_timeout_ms: u64,

    /// How long the dispatch loop sleeps on an empty queue before re-checking
    pub idle_poll_ms: u64,

    pub retry: RetryConfig,

    pub unhandled: UnhandledConfig,

    /// Capacity of the engine event broadcast channel
    pub event_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 250,
            request_timeout_ms: 30_000,
            idle_poll_ms: 250,
            retry: RetryConfig::default(),
            unhandled: UnhandledConfig::default(),
            event_capacity: 1024,
        }
    }
}

impl BrokerConfig {
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
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.idle_poll_ms == 0 {
            return Err(ConfigError::Invalid("idle_poll_ms must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter) {
            return Err(ConfigError::Invalid(format!(
                "retry.jitter must be within [0, 1], got {}",
                self.retry.jitter
            )));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be positive".to_string()));
        }
        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

/// Retry behaviour for requests that time out or hit a connectivity fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total dispatches allowed per request, the first one included
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Jitter as a fraction of the delay (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
            jitter: 0.1,
        }
    }
}

/// What to do with replies for names that have no completion handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledPolicy {
    /// Keep the completion and hand it over once a handler is registered
    #[default]
    Buffer,
    /// Refuse submissions for names without a handler
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnhandledConfig {
    pub policy: UnhandledPolicy,
    /// Bound on buffered completions and on stray replies kept for inspection
    pub capacity: usize,
}

impl Default for UnhandledConfig {
    fn default() -> Self {
        Self {
            policy: UnhandledPolicy::Buffer,
            capacity: 64,
        }
    }
}
