use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar day with no time-of-day and no timezone.
///
/// Conceptually this is the UTC midnight of the day: converting to an instant
/// and back only ever reads UTC components. Zoned timestamps enter through
/// [`crate::timezone`], which picks the calendar day once; nothing downstream
/// re-derives a day from a zoned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

#[derive(Error, Debug, PartialEq)]
#[error("Invalid calendar date: {0}")]
pub struct ParseCalendarDateError(String);

impl CalendarDate {
    pub const MIN: CalendarDate = CalendarDate(NaiveDate::MIN);
    pub const MAX: CalendarDate = CalendarDate(NaiveDate::MAX);

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Calendar day of a UTC instant, read from its UTC components.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    pub fn to_utc_midnight(self) -> DateTime<Utc> {
        self.0.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::days(days)).map(Self)
    }

    /// Like [`add_days`](Self::add_days) but clamps at the representable range.
    pub fn saturating_add_days(self, days: i64) -> Self {
        self.add_days(days)
            .unwrap_or(if days >= 0 { Self::MAX } else { Self::MIN })
    }

    pub fn succ(self) -> Self {
        self.saturating_add_days(1)
    }

    pub fn pred(self) -> Self {
        self.saturating_add_days(-1)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: CalendarDate) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = ParseCalendarDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ParseCalendarDateError(s.to_string()))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
