//! Relay Engine
//!
//! Turns a venue that accepts one call at a time, needs calls spaced apart,
//! and answers through out-of-band notifications into an ordered, retryable
//! request stream.
//!
//! ## Architecture
//!
//! ```text
//!   submit() ──► RequestQueue ──► DispatchLoop ──► Venue::invoke
//!                    ▲   ▲            │ RateGate, CorrelationLock
//!          retries ──┘   │            ▼
//!                        │      wait for release / timeout
//!       continuations ───┘            ▲
//!                                     │ release
//!   Venue ── Notification ──► CallbackRouter ──► decoders, Paginator,
//!                                                completion handlers
//! ```
//!
//! Only one request is ever in flight. A reply is matched against the request
//! in flight by name; whichever of router or loop takes the in-flight slot
//! first decides whether the request completed or timed out.

pub mod broker;
pub mod config;
pub mod correlation;
mod dispatcher;
pub mod error;
pub mod events;
pub mod pagination;
pub mod queue;
pub mod rate_gate;
pub mod registry;
pub mod request;
pub mod retry;
pub mod router;
mod shared;

// Re-export commonly used types
pub use broker::Broker;
pub use config::{BrokerConfig, RetryConfig, UnhandledConfig, UnhandledPolicy};
pub use correlation::CorrelationLock;
pub use error::{ConfigError, EngineError, Result};
pub use events::{EngineEvent, EventBus};
pub use pagination::{PageVerdict, Paginator};
pub use queue::RequestQueue;
pub use rate_gate::RateGate;
pub use request::{
    Completion, CompletionHandler, Decoded, Decoder, Decoding, Request, SeriesSpec, Submission,
};
pub use retry::RetryPolicy;
pub use router::CallbackRouter;
pub use shared::PushHandler;
