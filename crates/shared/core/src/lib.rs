//! Relay Core Domain
//!
//! Pure domain types for the Relay venue broker.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod market;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Request identity
    CorrelationToken,
    // Fetch window
    FetchParams,
    // Paged results
    Outcome,
    Page,
    Record,
    RequestName,
    ResultAccumulator,
    SeriesKey,
    WindowCheck,
};
pub use error::{RecordError, RecordResult};
pub use market::{Candle, Contract, ContractSide, Holding, OrderKind, OrderTicket, PriceKind, StockInfo};
pub use values::{Price, Quantity, SeriesTime, Timestamp};
