//! Relay Ports
//!
//! Port definitions (traits) for the Relay venue broker.
//! These define the boundaries between the broker engine and the venue it wraps.

mod clock;
mod error;
mod notification;
mod page;
mod venue;

pub use clock::Clock;
pub use error::{VenueError, VenueResult};
pub use notification::{Notification, Push, Reply};
pub use page::PageReader;
pub use venue::{NotificationSink, Venue, VenueCall};
