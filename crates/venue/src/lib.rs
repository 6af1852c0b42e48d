//! Relay Venue
//!
//! Everything specific to the brokerage venue Relay fronts:
//! - Request catalogue (login, quotes, charts, account, condition search, orders)
//! - Reply decoders that turn result pages into typed outcomes
//! - Account mirror fed by push notifications
//! - A simulated venue for tests and dry runs
//!
//! ## Architecture
//!
//! ```text
//!  requests::* ──► Broker::submit ──► Venue::invoke
//!                                         │
//!                          ┌──────────────┴───────────────┐
//!                     Reply (by name)              Push (by topic)
//!                          │                              │
//!                     decoders::*                   AccountMirror
//! ```

pub mod adapters;
pub mod decoders;
pub mod error;
pub mod mirror;
pub mod requests;
pub mod topics;

// Re-export commonly used types
pub use adapters::simulator::{Invocation, Market, Response, SimulatedVenue};
pub use decoders::ConditionEntry;
pub use error::DecodeError;
pub use mirror::AccountMirror;
