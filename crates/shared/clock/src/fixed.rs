use chrono::{Duration, TimeZone, Utc};
use parking_lot::RwLock;
use relay_core::Timestamp;
use relay_ports::Clock;
use std::sync::Arc;

/// Clock that only moves when told to
pub struct FixedClock {
    current: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(time: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(time),
        })
    }

    /// Clock frozen at the given UTC wall time.
    ///
    /// Out-of-range components fall back to the Unix epoch.
    pub fn at_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Arc<Self> {
        let time = Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .unwrap_or_default();
        Self::new(time)
    }

    pub fn set(&self, time: Timestamp) {
        *self.current.write() = time;
    }

    pub fn advance(&self, duration: Duration) {
        let mut guard = self.current.write();
        *guard += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "FixedClock"
    }
}
