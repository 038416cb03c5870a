use chrono::Utc;
use std::fmt;

use crate::date::CalendarDate;
use crate::error::RangeError;
use crate::recurrence::rule::RecurrenceRule;

/// Every occurrence of `rule` between `range_start` and `range_end`, both
/// inclusive, in ascending order.
///
/// Pure: identical inputs give identical output. The bounds must already be
/// calendar dates; see [`crate::timezone`] for turning timestamps into them.
pub fn expand(
    rule: &RecurrenceRule,
    range_start: CalendarDate,
    range_end: CalendarDate,
) -> Result<Vec<CalendarDate>, RangeError> {
    if range_end < range_start {
        return Err(RangeError::EndBeforeStart {
            start: range_start,
            end: range_end,
        });
    }
    if range_end < rule.anchor {
        return Ok(Vec::new());
    }
    Ok(rule
        .occurrences_from(range_start)
        .take_while(|date| *date <= range_end)
        .collect())
}

impl RecurrenceRule {
    /// Lazy iterator over occurrences on or after `from`.
    ///
    /// Walks the `rrule` set from the anchor, so COUNT is consumed by the
    /// occurrences before `from` too.
    pub fn occurrences_from(&self, from: CalendarDate) -> Occurrences<'_> {
        let lower = from.max(self.anchor);
        let until = self.until;
        let dates = (&self.set)
            .into_iter()
            .map(|instant| CalendarDate::from_utc(instant.with_timezone(&Utc)))
            .take_while(move |date| until.map_or(true, |until| *date <= until))
            .filter(move |date| self.matches_by_parts(*date))
            .skip_while(move |date| *date < lower);
        Occurrences {
            dates: Box::new(dates),
        }
    }

    pub fn is_occurrence(&self, date: CalendarDate) -> bool {
        self.occurrences_from(date).next() == Some(date)
    }

    /// The anchor only counts as an occurrence when it satisfies BYDAY and
    /// BYMONTHDAY like any other date.
    fn matches_by_parts(&self, date: CalendarDate) -> bool {
        (self.by_weekday.is_empty() || self.by_weekday.contains(&date.weekday()))
            && (self.by_month_day.is_empty() || self.by_month_day.contains(&date.day()))
    }
}

/// Iterator returned by [`RecurrenceRule::occurrences_from`].
pub struct Occurrences<'a> {
    dates: Box<dyn Iterator<Item = CalendarDate> + 'a>,
}

impl fmt::Debug for Occurrences<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occurrences").finish_non_exhaustive()
    }
}

impl Iterator for Occurrences<'_> {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        self.dates.next()
    }
}
