//! Microsecond-precision wall-clock timestamp
//!
//! Records carry `created_at` / `updated_at` as microseconds since Unix epoch.
//!
//! ```
//! use collstore_core::Timestamp;
//!
//! let now = Timestamp::now();
//! let earlier = Timestamp::from_secs(1000);
//! assert!(earlier.is_before(now));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Microseconds since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create a timestamp for the current moment
    ///
    /// Returns epoch if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_micros() as u64)
    }

    /// Create a timestamp from microseconds since epoch
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Get microseconds since Unix epoch
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Get seconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Duration since an earlier timestamp, `None` if `earlier` is later
    pub fn duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0
            .checked_sub(earlier.0)
            .map(Duration::from_micros)
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.as_secs(), self.0 % 1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_agree() {
        assert_eq!(Timestamp::from_secs(2), Timestamp::from_micros(2_000_000));
        assert_eq!(Timestamp::from_secs(2).as_secs(), 2);
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(Timestamp::EPOCH.is_before(Timestamp::now()));
    }

    #[test]
    fn test_duration_since() {
        let a = Timestamp::from_micros(1_500);
        let b = Timestamp::from_micros(500);
        assert_eq!(a.duration_since(b), Some(Duration::from_micros(1_000)));
        assert_eq!(b.duration_since(a), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Timestamp::from_micros(3_000_042).to_string(), "3.000042");
    }
}
