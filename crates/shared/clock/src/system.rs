use chrono::Utc;
use relay_core::Timestamp;
use relay_ports::Clock;

/// Wall clock of a live venue session
///
/// Wrapped in a [`Calendar`](crate::Calendar) it yields the dates and series
/// keys that live requests are built from. Completions are stamped with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "system"
    }
}
