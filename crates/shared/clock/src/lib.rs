//! Relay Clock Infrastructure
//!
//! Wall-clock sources behind the [`Clock`] port and the calendar helpers
//! venue requests are built from.
//!
//! ```ignore
//! use relay_clock::{Calendar, FixedClock};
//! use std::sync::Arc;
//!
//! let clock = FixedClock::at_ymd_hms(2023, 1, 2, 9, 30, 0);
//! let calendar = Calendar::kst(clock.clone());
//! assert_eq!(calendar.today(), "20230102");
//! clock.advance(chrono::Duration::days(1));
//! ```

mod calendar;
mod fixed;
mod system;

pub use calendar::{Calendar, DATE_FORMAT, DATETIME_FORMAT};
pub use fixed::FixedClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use relay_ports::Clock;
