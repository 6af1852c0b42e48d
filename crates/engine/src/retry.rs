use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Bounded exponential backoff for re-dispatching a request
///
/// Delay before the next dispatch: min(max_delay, base * 2^(attempts - 1)) + random_jitter
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base: Duration,
    max_delay: Duration,
    jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// # Arguments
    /// * `max_attempts` - Dispatches allowed per request, the first one included
    /// * `base` - Delay after the first failed attempt
    /// * `max_delay` - Maximum delay cap
    /// * `jitter_factor` - Jitter as a fraction of delay (0.0 to 1.0). Negative values are clamped to 0.
    pub fn new(max_attempts: u32, base: Duration, max_delay: Duration, jitter_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base,
            max_delay,
            jitter_factor: jitter_factor.max(0.0),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
            config.jitter,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a request that has been dispatched `attempts` times may go again
    pub fn allows_another(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Backoff before re-dispatching a request that failed `attempts` times
    pub fn delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1);
        let exp_delay = self.base.saturating_mul(2u32.saturating_pow(exponent));
        let capped_delay = exp_delay.min(self.max_delay);

        // Random value in [-jitter_factor, +jitter_factor] of the delay
        let jitter_range = capped_delay.as_secs_f64() * self.jitter_factor;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };

        Duration::from_secs_f64((capped_delay.as_secs_f64() + jitter).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(500), Duration::from_secs(4), 0.0)
    }

    #[test]
    fn test_delay_doubles_then_caps() {
        let policy = deterministic();
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(2), Duration::from_secs(1));
        assert_eq!(policy.delay(3), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(4));
        assert_eq!(policy.delay(9), Duration::from_secs(4));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = deterministic();
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(4));
        assert!(!policy.allows_another(5));

        let single = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 0.0);
        assert_eq!(single.max_attempts(), 1);
        assert!(!single.allows_another(1));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::new(5, Duration::from_secs(10), Duration::from_secs(60), 0.2);
        for _ in 0..20 {
            let secs = policy.delay(1).as_secs_f64();
            assert!((8.0..=12.0).contains(&secs), "delay was {secs}");
        }
    }
}
