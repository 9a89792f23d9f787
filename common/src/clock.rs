//! Clock & business calendar.
//!
//! The engine never reads the wall clock directly — every operation takes
//! its notion of "now" from an injected `Clock`, and every daily-cap
//! computation goes through `BusinessCalendar::business_date`. This keeps
//! day-rollover and DST-transition behavior deterministic under test.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use thiserror::Error;

/// Source of "now" for the engine. Implementations must be cheap to call —
/// it is invoked at least once per `assign`/`reassign`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns a fixed instant, for deterministic tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Error)]
#[error("unknown IANA timezone: {0}")]
pub struct InvalidTimezone(String);

/// Maps instants to business dates in a single configured timezone, fixed
/// at process start.
///
/// The civil date in this timezone is the sole source of "today" for
/// daily-cap bucketing — nothing else in the engine computes a date.
#[derive(Clone, Copy, Debug)]
pub struct BusinessCalendar {
    tz: Tz,
}

impl BusinessCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parses an IANA timezone name (e.g. `"Asia/Kolkata"`).
    pub fn from_iana_name(name: &str) -> Result<Self, InvalidTimezone> {
        Tz::from_str(name)
            .map(Self::new)
            .map_err(|_| InvalidTimezone(name.to_string()))
    }

    pub fn business_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}
