use relay_core::Timestamp;

/// Port for wall-clock time
///
/// The engine paces itself with the async runtime's monotonic clock; this port
/// only supplies calendar time for building venue inputs (dates, market hours).
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
