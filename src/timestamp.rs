//! Timezone-bound timestamps with calendar-aware offsetting and rounding.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::error::{DateMathError, Result};
use crate::unit::Unit;

/// An absolute instant bound to an IANA time zone.
///
/// A `Timestamp` is never mutated in place: each operation produces a new
/// value, which the math engine threads into the next operation. Equality
/// compares instants, so two timestamps in different zones naming the same
/// moment are equal.
///
/// Calendar-unit arithmetic (years, months) follows calendar semantics:
/// adding a month to the last day of a long month clamps to the last valid
/// day of the target month. Day and week arithmetic preserves the local
/// wall-clock time across DST transitions; hour, minute, and second
/// arithmetic operates on the instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    inner: DateTime<Tz>,
}

impl Timestamp {
    /// Wrap an already zone-bound datetime.
    pub fn new(inner: DateTime<Tz>) -> Timestamp {
        Timestamp { inner }
    }

    /// Bind a UTC instant to the UTC zone.
    pub fn from_utc(instant: DateTime<Utc>) -> Timestamp {
        Timestamp {
            inner: instant.with_timezone(&chrono_tz::UTC),
        }
    }

    /// The underlying zone-bound datetime.
    pub fn datetime(&self) -> DateTime<Tz> {
        self.inner
    }

    /// The zone this timestamp is bound to.
    pub fn zone(&self) -> Tz {
        self.inner.timezone()
    }

    // ── Calendar field accessors (in the bound zone) ────────────────────

    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour()
    }

    pub fn minute(&self) -> u32 {
        self.inner.minute()
    }

    pub fn second(&self) -> u32 {
        self.inner.second()
    }

    // ── Offsetting ──────────────────────────────────────────────────────

    /// Add a signed number of units, producing a new timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DateMathError::Malformed`] if the shift leaves the
    /// representable datetime range, or if day-level arithmetic lands on a
    /// local time that does not exist in this zone (DST gap).
    pub fn shift(self, delta: i64, unit: Unit) -> Result<Timestamp> {
        match unit {
            Unit::Years => {
                let months = delta
                    .checked_mul(12)
                    .ok_or_else(|| self.out_of_range(delta, unit))?;
                self.shift_months(months)
            }
            Unit::Months => self.shift_months(delta),
            Unit::Weeks => {
                let days = delta
                    .checked_mul(7)
                    .ok_or_else(|| self.out_of_range(delta, unit))?;
                self.shift_days(days)
            }
            Unit::Days => self.shift_days(delta),
            Unit::Hours => self.shift_instant(Duration::try_hours(delta), delta, unit),
            Unit::Minutes => self.shift_instant(Duration::try_minutes(delta), delta, unit),
            Unit::Seconds => self.shift_instant(Duration::try_seconds(delta), delta, unit),
        }
    }

    /// Month arithmetic on the local datetime, clamping to the last valid
    /// day of the target month, then rebound to the zone.
    fn shift_months(self, months: i64) -> Result<Timestamp> {
        let n = u32::try_from(months.unsigned_abs())
            .map_err(|_| self.out_of_range(months, Unit::Months))?;
        let local = self.inner.naive_local();
        let shifted = if months >= 0 {
            local.checked_add_months(Months::new(n))
        } else {
            local.checked_sub_months(Months::new(n))
        }
        .ok_or_else(|| self.out_of_range(months, Unit::Months))?;
        self.rebind(shifted)
    }

    /// Day arithmetic on the local datetime, preserving wall-clock time
    /// across DST transitions, then rebound to the zone.
    fn shift_days(self, days: i64) -> Result<Timestamp> {
        let delta =
            Duration::try_days(days).ok_or_else(|| self.out_of_range(days, Unit::Days))?;
        let shifted = self
            .inner
            .naive_local()
            .checked_add_signed(delta)
            .ok_or_else(|| self.out_of_range(days, Unit::Days))?;
        self.rebind(shifted)
    }

    /// Clock arithmetic on the instant itself.
    fn shift_instant(self, delta: Option<Duration>, magnitude: i64, unit: Unit) -> Result<Timestamp> {
        delta
            .and_then(|d| self.inner.checked_add_signed(d))
            .map(Timestamp::new)
            .ok_or_else(|| self.out_of_range(magnitude, unit))
    }

    // ── Rounding ────────────────────────────────────────────────────────

    /// Truncate to the start of the given unit in the bound zone.
    ///
    /// Truncating to days zeroes hour, minute, second, and sub-second;
    /// truncating to weeks lands on Monday 00:00 (ISO week start); months
    /// and years land on the first of the month and January 1 respectively.
    /// Idempotent for every unit.
    ///
    /// # Errors
    ///
    /// Returns [`DateMathError::Malformed`] if the truncated local time
    /// does not exist in this zone (DST gap at a unit boundary).
    pub fn truncate(self, unit: Unit) -> Result<Timestamp> {
        let local = self.inner.naive_local();
        let date = local.date();
        let truncated = match unit {
            Unit::Years => start_of_day(NaiveDate::from_ymd_opt(date.year(), 1, 1)),
            Unit::Months => start_of_day(NaiveDate::from_ymd_opt(date.year(), date.month(), 1)),
            Unit::Weeks => {
                let back = Duration::days(i64::from(date.weekday().num_days_from_monday()));
                start_of_day(date.checked_sub_signed(back))
            }
            Unit::Days => start_of_day(Some(date)),
            Unit::Hours => date.and_hms_opt(local.hour(), 0, 0),
            Unit::Minutes => date.and_hms_opt(local.hour(), local.minute(), 0),
            Unit::Seconds => date.and_hms_opt(local.hour(), local.minute(), local.second()),
        }
        .ok_or_else(|| {
            DateMathError::Malformed(format!("cannot truncate {self} to start of {unit:?}"))
        })?;
        self.rebind(truncated)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    /// Rebind a local datetime to this timestamp's zone. An ambiguous
    /// local time (DST fall-back) resolves to the earlier offset.
    fn rebind(self, local: NaiveDateTime) -> Result<Timestamp> {
        let tz = self.inner.timezone();
        tz.from_local_datetime(&local)
            .earliest()
            .map(Timestamp::new)
            .ok_or_else(|| {
                DateMathError::Malformed(format!("local time {local} does not exist in {tz}"))
            })
    }

    fn out_of_range(&self, magnitude: i64, unit: Unit) -> DateMathError {
        DateMathError::Malformed(format!(
            "shifting {self} by {magnitude}{} leaves the representable range",
            unit.code()
        ))
    }
}

/// Midnight on the given date, if the date itself is valid.
fn start_of_day(date: Option<NaiveDate>) -> Option<NaiveDateTime> {
    date.and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // chrono's serde support emits the RFC 3339 form
        self.inner.serialize(serializer)
    }
}
