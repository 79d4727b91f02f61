//! Wall-clock source for the live "now" marker on the day view.
//!
//! The engine owns no timer. The UI decides when to refresh and asks a
//! [`Clock`] for the current local time.

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SlotError};
use crate::time;

pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// The host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Wall-clock time in a named IANA zone, for a clinic whose calendar is not in
/// the host's zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    /// # Errors
    /// Returns `SlotError::InvalidTimezone` if `name` is not an IANA identifier.
    pub fn new(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(name.to_string()))?;
        Ok(Self { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Minute of day for the "now" marker when `date` is today, `None` otherwise.
pub fn current_time_marker(clock: &dyn Clock, date: NaiveDate) -> Option<i64> {
    let now = clock.now();
    (now.date() == date).then(|| time::minute_of_day(now))
}
