//! Wall-clock source for task ids, completion stamps and presentation
//! deadlines.
//!
//! All timestamps are truncated to whole milliseconds so persisted values
//! compare equal after a round trip.

use chrono::{DateTime, Utc};
use std::cell::Cell;

/// Time source used by the board service.
pub trait Clock {
    /// Current time, millisecond precision.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }
}

/// Manually advanced clock for deterministic callers and tests.
#[derive(Debug)]
pub struct ManualClock {
    millis: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: Cell::new(start_millis),
        }
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.set(self.millis.get().saturating_add(delta));
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.set(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.get()).unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.millis.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Drops sub-millisecond precision.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}
