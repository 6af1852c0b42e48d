use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Share count. The venue trades whole shares only.
pub type Quantity = i64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Sortable series key in `YYYYMMDDhhmmss` digit form (e.g. `20230101093000`).
///
/// Venue timestamps are compared as integers, so shorter forms such as
/// `YYYYMMDD` still order correctly against each other.
pub type SeriesTime = u64;

/// Remove the direction sign the venue prefixes to price fields (`-12300` means
/// "12300, down from yesterday").
pub fn strip_sign(value: &str) -> &str {
    value.trim().trim_start_matches(['+', '-'])
}

/// Parse a venue string, falling back to `default` when it is empty or malformed.
pub fn safe_cast<T: FromStr>(value: &str, default: T) -> T {
    value.trim().parse().unwrap_or(default)
}

/// Parse a signed price field into an unsigned price.
pub fn parse_price(value: &str) -> Price {
    safe_cast(strip_sign(value), Decimal::ZERO)
}

/// Parse a series key; `None` when the field is not all digits.
pub fn parse_series_time(value: &str) -> Option<SeriesTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
