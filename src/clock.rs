use chrono::{DateTime, Utc};

/// Source of wall-clock time for everything that stamps or measures a session.
/// Swapped for a manual clock in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
