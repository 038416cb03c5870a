//! The single place where zoned timestamps become [`CalendarDate`]s.
//!
//! A timestamp's calendar day is its wall-clock day in the zone it was
//! produced in. That choice is made here, once; the recurrence and ledger code
//! only ever sees calendar dates.

use crate::date::CalendarDate;
use crate::error::CoreError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone.trim())
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Calendar day of `instant` as seen on a wall clock in its own zone.
pub fn calendar_date_in<Z: TimeZone>(instant: &DateTime<Z>) -> CalendarDate {
    CalendarDate::from_naive(instant.date_naive())
}

/// Today's calendar day in `tz`.
pub fn today_in(tz: &Tz) -> CalendarDate {
    calendar_date_in(&Utc::now().with_timezone(tz))
}

/// Resolves a local wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earliest mapping; times skipped by a DST jump move
/// forward one hour.
pub fn local_to_utc(naive: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return local.with_timezone(&Utc);
    }
    let shifted = naive + chrono::Duration::hours(1);
    match tz.from_local_datetime(&shifted).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    }
}

/// A `scheduled` or `due` value: a calendar day, optionally with a time of day
/// and optionally pinned to a fixed offset. Times without an offset float and
/// are placed in the configured zone when an instant is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDate {
    pub date: CalendarDate,
    pub time: Option<NaiveTime>,
    pub offset: Option<FixedOffset>,
}

impl TaskDate {
    pub fn all_day(date: CalendarDate) -> Self {
        Self {
            date,
            time: None,
            offset: None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    /// Same time-of-day and offset, moved to another calendar day.
    pub fn with_date(&self, date: CalendarDate) -> Self {
        Self { date, ..*self }
    }

    /// The instant this value starts at. All-day values start at the UTC
    /// midnight of their day.
    pub fn start_instant(&self, tz: &Tz) -> DateTime<Utc> {
        let Some(time) = self.time else {
            return self.date.to_utc_midnight();
        };
        let naive = self.date.naive().and_time(time);
        match self.offset {
            Some(offset) => match offset.from_local_datetime(&naive).single() {
                Some(dt) => dt.with_timezone(&Utc),
                None => naive.and_utc(),
            },
            None => local_to_utc(naive, tz),
        }
    }
}

impl FromStr for TaskDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();

        let zoned = DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"));
        if let Ok(dt) = zoned {
            return Ok(Self {
                date: calendar_date_in(&dt),
                time: Some(dt.time()),
                offset: Some(*dt.offset()),
            });
        }
        if let Some(naive) = raw
            .strip_suffix('Z')
            .and_then(|rest| NaiveDateTime::parse_from_str(rest, "%Y-%m-%dT%H:%M").ok())
        {
            return Ok(Self {
                date: CalendarDate::from_naive(naive.date()),
                time: Some(naive.time()),
                offset: FixedOffset::east_opt(0),
            });
        }

        let floating = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"));
        if let Ok(naive) = floating {
            return Ok(Self {
                date: CalendarDate::from_naive(naive.date()),
                time: Some(naive.time()),
                offset: None,
            });
        }

        raw.parse::<CalendarDate>()
            .map(Self::all_day)
            .map_err(|_| CoreError::InvalidInput(format!("Unrecognized date value: '{}'", s)))
    }
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(time) = self.time else {
            return write!(f, "{}", self.date);
        };
        let time_fmt = if chrono::Timelike::second(&time) == 0 {
            "%H:%M"
        } else {
            "%H:%M:%S"
        };
        write!(f, "{}T{}", self.date, time.format(time_fmt))?;
        match self.offset {
            Some(offset) if offset.local_minus_utc() == 0 => write!(f, "Z"),
            Some(offset) => write!(f, "{}", offset),
            None => Ok(()),
        }
    }
}
