//! Relay Runner
//!
//! Runs a session against a venue:
//!
//! - **Config**: broker settings, account, watchlist and chart window from JSON
//! - **Bootstrap**: broker, venue and account mirror wired together
//! - **Session**: the startup request sequence and order placement
//!
//! ## Architecture
//!
//! ```text
//!   RunnerConfig ──► Bootstrap ──► Broker ◄──► SimulatedVenue
//!                        │           │
//!                        ▼           ▼ completions
//!                  AccountMirror ◄── Session
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod session;

// Re-export main types
pub use bootstrap::Bootstrap;
pub use config::{ChartConfig, RunnerConfig};
pub use error::{Result, RunnerError};
pub use session::{Session, SessionReport};
