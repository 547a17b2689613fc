//! Timestamp utilities and the logical playback clock

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Simulated clock used to timestamp playback events
///
/// The clock only moves when told to. It is anchored at an origin instant and
/// keeps a signed offset in whole seconds, so it can be moved backward (crossfade
/// overlap) as well as forward. It never consults the wall clock after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalClock {
    origin: DateTime<Utc>,
    offset_seconds: i64,
}

impl LogicalClock {
    /// Create a clock reading `origin`
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            offset_seconds: 0,
        }
    }

    /// Current logical instant
    pub fn now(&self) -> DateTime<Utc> {
        self.origin + Duration::seconds(self.offset_seconds)
    }

    /// Instant the clock was anchored at
    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    /// Move the clock by `seconds` (negative moves it backward)
    pub fn advance(&mut self, seconds: i64) {
        self.offset_seconds += seconds;
    }

    /// Signed distance from the origin in seconds
    pub fn elapsed_seconds(&self) -> i64 {
        self.offset_seconds
    }
}

impl Default for LogicalClock {
    /// Clock anchored at the current wall-clock time
    fn default() -> Self {
        Self::starting_at(now())
    }
}
