//! Injectable wall clock.
//!
//! Every time-derived transition in the system (rank, accrual, tree
//! maturity, potion expiry, task timers) is computed lazily against an
//! injected `now`, so tests can drive time by hand.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock: `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
