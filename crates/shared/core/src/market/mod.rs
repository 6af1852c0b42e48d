//! Typed views over venue records.
//!
//! Field names are Relay's own stable names; adapters for a concrete venue
//! map their native item names onto these.

mod candle;
mod contract;
pub mod fields;
mod holding;
mod order;
mod stock;

pub use candle::Candle;
pub use contract::{Contract, ContractSide};
pub use holding::Holding;
pub use order::{OrderKind, OrderTicket, PriceKind};
pub use stock::StockInfo;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Buy budget per instrument, in account currency
pub const BUY_CEILING_PER_STOCK: i64 = 1_000_000;

/// Commission charged on buys, applied to the purchase price
pub const BUY_FEE_RATE: Decimal = dec!(0.00015);

/// Commission plus transaction tax charged on sells, applied to the sale price
pub const SELL_FEE_RATE: Decimal = dec!(0.00315);

/// Drop the market-prefix letter some notifications put in front of a code
/// (`A005930` becomes `005930`).
pub fn normalize_code(code: &str) -> &str {
    let code = code.trim();
    match code.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => &code[1..],
        _ => code,
    }
}
