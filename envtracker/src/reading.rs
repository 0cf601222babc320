//! Timestamped readings.

use chrono::Utc;

/// A payload stamped with the time it was taken.
///
/// The timestamp is captured when the reading is assembled for dispatch,
/// after the platform query returns, so it reflects when the data was in
/// hand rather than when the scan was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<T> {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub payload: T,
}

impl<T> Reading<T> {
    /// Stamps `payload` with the current wall clock.
    pub fn now(payload: T) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            payload,
        }
    }

    /// A reading with an explicit timestamp.
    pub fn at(timestamp_ms: i64, payload: T) -> Self {
        Self {
            timestamp_ms,
            payload,
        }
    }
}
