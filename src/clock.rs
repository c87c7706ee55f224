//! Time source used by validation and the derived properties.
//!
//! Every date-sensitive rule takes a [`Clock`] explicitly so tests can pin
//! "today" without touching process state.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Supplies the current instant and the current calendar day.
pub trait Clock {
    /// Current instant, used for `createdAt`/`updatedAt` stamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in local time. Time-of-day is already dropped.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    /// Freezes the clock at `now`; `today` is taken from its UTC date.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now, today: now.date_naive() }
    }

    /// Freezes the clock at midnight UTC of `today`.
    pub fn on(today: NaiveDate) -> Self {
        Self {
            now: today.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
            today,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
