//! Time provider abstraction
//!
//! Fridge items are stamped with the moment they were added. The stamp comes
//! from a [`Clock`] owned by the [`Larder`](crate::Larder) handle so tests can
//! pin it.
//!
//! # Example
//!
//! ```
//! use larder::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let added = clock.now();
//! assert!(added.timestamp() > 0);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, TimeZone, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A source of wall-clock timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64;

    /// Returns the current time as a UTC timestamp.
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_millis())
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to.
///
/// ```
/// use larder::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1_000);
/// assert_eq!(clock.now_millis(), 1_000);
/// clock.advance(500);
/// assert_eq!(clock.now_millis(), 1_500);
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    millis: Mutex<i64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock frozen at `millis` since Unix epoch.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, ms: i64) {
        *self.millis.lock().unwrap() += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: i64) {
        *self.millis.lock().unwrap() = ms;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        *self.millis.lock().unwrap()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &*self.millis.lock().unwrap())
            .finish()
    }
}
