use anyhow::Result;
use chrono::DateTime;
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use tasknote_core::date::CalendarDate;
use tasknote_core::timezone::calendar_date_in;

/// Parses a user-supplied day: `YYYY-MM-DD`, or natural language such as
/// "tomorrow" or "next monday" relative to `now`.
pub fn parse_calendar_date(input: &str, now: DateTime<Tz>) -> Result<CalendarDate> {
    if let Ok(date) = input.trim().parse::<CalendarDate>() {
        return Ok(date);
    }
    parse_date_string(input, now, Dialect::Us)
        .map(|parsed| calendar_date_in(&parsed))
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", input, e))
}
