//! Current-time source.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::duration::Duration;

/// Provides the current time in UTC.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock that always reports `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Returns a clock moved forward by `d`, or `None` if the result is out
    /// of range for a `DateTime<Utc>`.
    pub fn advanced(self, d: Duration) -> Option<Self> {
        self.0.checked_add_signed(d.into()).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
