use chrono::{DateTime, NaiveDate, Utc};

/// Time source injected into every time-dependent operation so that the
/// scheduler and lifecycle services stay deterministic under test.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Date-only view of `now`, used for all whole-day arithmetic.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed time source for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
