//! Wall-clock source for note creation timestamps.

/// Supplies `createdDate` values to the store.
///
/// Implementations must be cheap and non-blocking; the store calls this while
/// holding its write lock.
pub trait Clock: Send + Sync {
    /// Current time in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
