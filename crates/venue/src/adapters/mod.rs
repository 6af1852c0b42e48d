//! Venue adapters
//!
//! Adapters implement the [`relay_ports::Venue`] port and feed replies and
//! pushes back through a [`relay_ports::NotificationSink`].

pub mod simulator;

pub use simulator::{Invocation, Market, Response, SimulatedVenue};
