//! In-process simulated venue
//!
//! Answers the request catalogue from a [`Market`] fixture after a fixed
//! latency, with per-action overrides for dropped replies and failures.

mod market;
mod venue;

pub use market::{Market, Response, minute_bars};
pub use venue::{Invocation, Responder, SimulatedVenue};
