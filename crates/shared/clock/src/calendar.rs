use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, Timelike, Utc};
use relay_ports::Clock;
use std::sync::Arc;

/// `YYYYMMDD`
pub const DATE_FORMAT: &str = "%Y%m%d";
/// `YYYYMMDDhhmmss`, the venue's series key format
pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Calendar helpers in the venue's local time
///
/// All values are read from the wrapped [`Clock`] and shifted to a fixed
/// UTC offset.
#[derive(Clone)]
pub struct Calendar {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl Calendar {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// Calendar in Korea Standard Time (UTC+9)
    pub fn kst(clock: Arc<dyn Clock>) -> Self {
        let offset = FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Self::new(clock, offset)
    }

    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Today's date as `YYYYMMDD`
    pub fn today(&self) -> String {
        self.local_now().format(DATE_FORMAT).to_string()
    }

    /// The date `days` days back as `YYYYMMDD`
    pub fn days_ago(&self, days: i64) -> String {
        (self.local_now() - Duration::days(days))
            .format(DATE_FORMAT)
            .to_string()
    }

    /// Current local time as a series key
    pub fn now_key(&self) -> String {
        self.local_now().format(DATETIME_FORMAT).to_string()
    }

    /// 0-4 weekdays, 5-6 weekend
    pub fn weekday(&self) -> u32 {
        self.local_now().weekday().num_days_from_monday()
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday() >= 5
    }

    pub fn hour_minute(&self) -> (u32, u32) {
        let now = self.local_now();
        (now.hour(), now.minute())
    }
}
