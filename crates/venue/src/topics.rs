//! Push notification topics

/// Order accepted / filled notices
pub const EXECUTION: &str = "execution";
/// Position balance changes
pub const BALANCE: &str = "balance";
/// Real-time condition search membership changes
pub const CONDITION: &str = "condition";
/// Registered real-time market data
pub const REAL: &str = "real";
