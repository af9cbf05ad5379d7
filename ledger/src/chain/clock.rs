//! UTC clock collaborator.

use chrono::{DateTime, Utc};

use crate::types::Timestamp;

/// Source of block timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC time, truncated to whole seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// Always returns the same instant. Used for reproducible hashes.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    pub fn at(at: DateTime<Utc>) -> Self {
        FixedClock(Timestamp::from_datetime(at))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
