//! Minimum spacing between consecutive dispatches

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a fixed minimum interval between dispatch instants
///
/// The gate only remembers the last dispatch; it never refuses work, it just
/// makes the caller wait for its turn.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Earliest instant the next dispatch may happen, if there was a previous one
    pub fn next_allowed(&self) -> Option<Instant> {
        self.last_dispatch.lock().map(|last| last + self.min_interval)
    }

    pub fn can_dispatch_now(&self) -> bool {
        self.next_allowed()
            .is_none_or(|allowed| Instant::now() >= allowed)
    }

    /// Mark "a dispatch happened now"
    pub fn record_dispatch(&self) {
        *self.last_dispatch.lock() = Some(Instant::now());
    }

    /// Sleep until a dispatch is allowed
    pub async fn wait_turn(&self) {
        if let Some(allowed) = self.next_allowed() {
            if Instant::now() < allowed {
                tokio::time::sleep_until(allowed).await;
            }
        }
    }
}
