use chrono::{NaiveDate, Weekday};
use rrule::RRuleSet;
use std::fmt;

use crate::date::CalendarDate;
use crate::error::RecurrenceRuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

/// The supported subset of an RRULE: FREQ, INTERVAL, BYDAY, BYMONTHDAY,
/// UNTIL, COUNT and WKST, plus a single DTSTART anchor.
///
/// Parsing rejects everything outside that subset. What is accepted is handed
/// to [`rrule`] as an `RRuleSet` anchored at the UTC midnight of the anchor
/// day, which does the actual date generation.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    pub(super) frequency: Frequency,
    /// Zero is read as one.
    pub(super) interval: u32,
    /// Sorted Monday-first, no duplicates. Empty means "no constraint".
    pub(super) by_weekday: Vec<Weekday>,
    /// Monthly rules only. Sorted, no duplicates.
    pub(super) by_month_day: Vec<u32>,
    /// First legal occurrence; nothing is generated before it.
    pub(super) anchor: CalendarDate,
    pub(super) until: Option<CalendarDate>,
    pub(super) count: Option<u32>,
    pub(super) week_start: Weekday,
    /// UNTIL is left out of the set and applied while iterating, so an
    /// UNTIL before the anchor is just an empty series.
    pub(super) set: RRuleSet,
}

impl PartialEq for RecurrenceRule {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency
            && self.effective_interval() == other.effective_interval()
            && self.by_weekday == other.by_weekday
            && self.by_month_day == other.by_month_day
            && self.anchor == other.anchor
            && self.until == other.until
            && self.count == other.count
            && self.week_start == other.week_start
    }
}

impl Eq for RecurrenceRule {}

/// Parsed rule parts before the `RRuleSet` is built.
struct RuleParts {
    frequency: Frequency,
    interval: u32,
    by_weekday: Vec<Weekday>,
    by_month_day: Vec<u32>,
    anchor: CalendarDate,
    until: Option<CalendarDate>,
    count: Option<u32>,
    week_start: Weekday,
}

impl RuleParts {
    fn new(frequency: Frequency, anchor: CalendarDate) -> Self {
        Self {
            frequency,
            interval: 1,
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            anchor,
            until: None,
            count: None,
            week_start: Weekday::Mon,
        }
    }

    /// Everything after DTSTART, in canonical order.
    fn rule_parts(&self, with_until: bool) -> Vec<String> {
        let mut parts = vec![format!("FREQ={}", self.frequency)];
        if self.interval.max(1) != 1 {
            parts.push(format!("INTERVAL={}", self.interval.max(1)));
        }
        if !self.by_weekday.is_empty() {
            let days: Vec<&str> = self.by_weekday.iter().map(|d| weekday_code(*d)).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(u32::to_string).collect();
            parts.push(format!("BYMONTHDAY={}", days.join(",")));
        }
        if let Some(until) = self.until.filter(|_| with_until) {
            parts.push(format!("UNTIL={}", until.naive().format("%Y%m%d")));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={}", count));
        }
        if self.week_start != Weekday::Mon {
            parts.push(format!("WKST={}", weekday_code(self.week_start)));
        }
        parts
    }

    fn build(self) -> Result<RecurrenceRule, RecurrenceRuleError> {
        if !(1..=9999).contains(&self.anchor.year()) {
            return Err(RecurrenceRuleError::MalformedAnchor(format!(
                "{} is outside the supported years",
                self.anchor
            )));
        }
        if u16::try_from(self.interval).is_err() {
            return Err(RecurrenceRuleError::InvalidInterval(self.interval.to_string()));
        }

        let text = format!(
            "DTSTART:{}T000000Z\nRRULE:{}",
            self.anchor.naive().format("%Y%m%d"),
            self.rule_parts(false).join(";")
        );
        let set = text
            .parse::<RRuleSet>()
            .map_err(|e| RecurrenceRuleError::UnsupportedFrequency(format!("{}: {}", text, e)))?;

        Ok(RecurrenceRule {
            frequency: self.frequency,
            interval: self.interval,
            by_weekday: self.by_weekday,
            by_month_day: self.by_month_day,
            anchor: self.anchor,
            until: self.until,
            count: self.count,
            week_start: self.week_start,
            set,
        })
    }
}

impl RecurrenceRule {
    pub fn daily(anchor: CalendarDate) -> Result<Self, RecurrenceRuleError> {
        RuleParts::new(Frequency::Daily, anchor).build()
    }

    pub fn weekly_on(anchor: CalendarDate, days: &[Weekday]) -> Result<Self, RecurrenceRuleError> {
        let mut parts = RuleParts::new(Frequency::Weekly, anchor);
        parts.by_weekday = normalize_weekdays(days.to_vec());
        parts.build()
    }

    pub fn with_interval(self, interval: u32) -> Result<Self, RecurrenceRuleError> {
        let mut parts = self.to_parts();
        parts.interval = interval;
        parts.build()
    }

    fn to_parts(&self) -> RuleParts {
        RuleParts {
            frequency: self.frequency,
            interval: self.interval,
            by_weekday: self.by_weekday.clone(),
            by_month_day: self.by_month_day.clone(),
            anchor: self.anchor,
            until: self.until,
            count: self.count,
            week_start: self.week_start,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }

    pub fn by_weekday(&self) -> &[Weekday] {
        &self.by_weekday
    }

    pub fn by_month_day(&self) -> &[u32] {
        &self.by_month_day
    }

    pub fn anchor(&self) -> CalendarDate {
        self.anchor
    }

    pub fn until(&self) -> Option<CalendarDate> {
        self.until
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Parses a compact rule string.
    ///
    /// Accepts `FREQ=...;INTERVAL=...` optionally preceded by a
    /// `DTSTART:YYYYMMDD[THHMMSS[Z]]` part, either on the same line separated
    /// by `;` or on its own line followed by an `RRULE:` line. When no DTSTART
    /// is present `fallback_anchor` is used.
    pub fn parse(
        text: &str,
        fallback_anchor: Option<CalendarDate>,
    ) -> Result<Self, RecurrenceRuleError> {
        let mut anchor = None;
        let mut parts: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let line = line.strip_prefix("RRULE:").unwrap_or(line);
            if line.to_ascii_uppercase().starts_with("DTSTART") {
                let (_, after_colon) = line.split_once(':').ok_or_else(|| {
                    RecurrenceRuleError::MalformedAnchor(line.to_string())
                })?;
                let (value, rest) = after_colon.split_once(';').unwrap_or((after_colon, ""));
                anchor = Some(parse_rule_date(value)?);
                parts.extend(rest.split(';'));
            } else {
                parts.extend(line.split(';'));
            }
        }

        let mut frequency = None;
        let mut interval = 1;
        let mut by_weekday = Vec::new();
        let mut by_month_day = Vec::new();
        let mut until = None;
        let mut count = None;
        let mut week_start = Weekday::Mon;

        for part in parts.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                RecurrenceRuleError::UnsupportedFrequency(format!("malformed rule part '{}'", part))
            })?;
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => frequency = Some(parse_frequency(value)?),
                "INTERVAL" => interval = parse_interval(value)?,
                "BYDAY" => {
                    by_weekday = value
                        .split(',')
                        .map(parse_weekday)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "BYMONTHDAY" => {
                    by_month_day = value
                        .split(',')
                        .map(parse_month_day)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "UNTIL" => until = Some(parse_rule_date(value)?),
                "COUNT" => count = Some(parse_count(value)?),
                "WKST" => week_start = parse_weekday(value)?,
                other => {
                    return Err(RecurrenceRuleError::UnsupportedFrequency(format!(
                        "unsupported rule part '{}'",
                        other
                    )))
                }
            }
        }

        let frequency = frequency.ok_or_else(|| {
            RecurrenceRuleError::UnsupportedFrequency(format!("missing FREQ in '{}'", text.trim()))
        })?;
        if !by_weekday.is_empty() && matches!(frequency, Frequency::Monthly | Frequency::Yearly) {
            return Err(RecurrenceRuleError::UnsupportedFrequency(format!(
                "BYDAY is not supported with FREQ={}",
                frequency
            )));
        }
        if !by_month_day.is_empty() && frequency != Frequency::Monthly {
            return Err(RecurrenceRuleError::UnsupportedFrequency(format!(
                "BYMONTHDAY is not supported with FREQ={}",
                frequency
            )));
        }
        let anchor = anchor.or(fallback_anchor).ok_or_else(|| {
            RecurrenceRuleError::MalformedAnchor(format!("no DTSTART in '{}'", text.trim()))
        })?;

        by_month_day.sort_unstable();
        by_month_day.dedup();

        RuleParts {
            frequency,
            interval,
            by_weekday: normalize_weekdays(by_weekday),
            by_month_day,
            anchor,
            until,
            count,
            week_start,
        }
        .build()
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DTSTART:{};{}",
            self.anchor.naive().format("%Y%m%d"),
            self.to_parts().rule_parts(true).join(";")
        )
    }
}

fn normalize_weekdays(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    days
}

fn parse_frequency(value: &str) -> Result<Frequency, RecurrenceRuleError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        other => Err(RecurrenceRuleError::UnsupportedFrequency(other.to_string())),
    }
}

fn parse_interval(value: &str) -> Result<u32, RecurrenceRuleError> {
    let interval: i64 = value
        .trim()
        .parse()
        .map_err(|_| RecurrenceRuleError::InvalidInterval(value.to_string()))?;
    match interval {
        i if i < 0 => Err(RecurrenceRuleError::InvalidInterval(value.to_string())),
        0 => Ok(1),
        i => u32::try_from(i).map_err(|_| RecurrenceRuleError::InvalidInterval(value.to_string())),
    }
}

fn parse_count(value: &str) -> Result<u32, RecurrenceRuleError> {
    match value.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(RecurrenceRuleError::InvalidInterval(format!("COUNT={}", value))),
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, RecurrenceRuleError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(RecurrenceRuleError::UnsupportedFrequency(format!(
            "unsupported weekday '{}'",
            other
        ))),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_month_day(value: &str) -> Result<u32, RecurrenceRuleError> {
    match value.trim().parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => Ok(day),
        _ => Err(RecurrenceRuleError::UnsupportedFrequency(format!(
            "unsupported month day '{}'",
            value
        ))),
    }
}

/// `YYYYMMDD`, optionally followed by `THHMMSS` and `Z`. Only the date part is
/// kept; it is read as written.
fn parse_rule_date(value: &str) -> Result<CalendarDate, RecurrenceRuleError> {
    let value = value.trim();
    let malformed = || RecurrenceRuleError::MalformedAnchor(value.to_string());

    if let Ok(date) = value.parse::<CalendarDate>() {
        return Ok(date);
    }

    let (day, time) = match value.split_once(|c: char| c == 'T' || c == 't') {
        Some((day, time)) => (day, Some(time)),
        None => (value, None),
    };
    if let Some(time) = time {
        let digits = time.strip_suffix(|c: char| c == 'Z' || c == 'z').unwrap_or(time);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
    }
    if day.len() != 8 {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(day, "%Y%m%d")
        .map(CalendarDate::from_naive)
        .map_err(|_| malformed())
}
