use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::date::CalendarDate;
use crate::error::LedgerConsistencyWarning;
use crate::models::InstanceStatus;
use crate::recurrence::RecurrenceRule;
use crate::timezone::TaskDate;

/// Occurrences examined by [`InstanceLedger::next_pending_on_or_after`]
/// before it gives up.
const PENDING_SCAN_LIMIT: usize = 1_000;
/// How far past the first candidate the pending scan looks.
const PENDING_SCAN_HORIZON_DAYS: i64 = 730;

/// Per-task record of which occurrence dates are completed or skipped.
///
/// The two sets are disjoint: writing a date into one removes it from the
/// other. Serializes to the persisted `completedInstances`/`skippedInstances`
/// shape, sorted and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceLedger {
    #[serde(rename = "completedInstances")]
    completed: BTreeSet<CalendarDate>,
    #[serde(rename = "skippedInstances")]
    skipped: BTreeSet<CalendarDate>,
}

impl InstanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from its persisted string lists.
    ///
    /// Unparseable entries are logged and dropped. A date listed in both is
    /// reported and ends up skipped, the skipped list being written last.
    pub fn from_serialized<S: AsRef<str>>(
        completed: &[S],
        skipped: &[S],
    ) -> (Self, Vec<LedgerConsistencyWarning>) {
        let writes: Vec<(CalendarDate, InstanceStatus)> = completed
            .iter()
            .map(|raw| (raw, InstanceStatus::Completed))
            .chain(skipped.iter().map(|raw| (raw, InstanceStatus::Skipped)))
            .filter_map(|(raw, status)| match parse_instance_date(raw.as_ref()) {
                Some(date) => Some((date, status)),
                None => {
                    warn!(value = raw.as_ref(), "dropping unparseable instance date");
                    None
                }
            })
            .collect();

        let mut ledger = Self::new();
        let warnings = ledger.apply(&writes);
        (ledger, warnings)
    }

    pub fn status_of(&self, date: CalendarDate) -> InstanceStatus {
        if self.completed.contains(&date) {
            InstanceStatus::Completed
        } else if self.skipped.contains(&date) {
            InstanceStatus::Skipped
        } else {
            InstanceStatus::Pending
        }
    }

    pub fn mark_completed(&mut self, date: CalendarDate) {
        self.skipped.remove(&date);
        self.completed.insert(date);
    }

    pub fn mark_skipped(&mut self, date: CalendarDate) {
        self.completed.remove(&date);
        self.skipped.insert(date);
    }

    pub fn clear(&mut self, date: CalendarDate) {
        self.completed.remove(&date);
        self.skipped.remove(&date);
    }

    pub fn mark(&mut self, date: CalendarDate, status: InstanceStatus) {
        match status {
            InstanceStatus::Completed => self.mark_completed(date),
            InstanceStatus::Skipped => self.mark_skipped(date),
            InstanceStatus::Pending => self.clear(date),
        }
    }

    /// Applies a batch of writes in order; the last write for a date wins.
    /// Dates written as both completed and skipped are reported.
    pub fn apply(&mut self, writes: &[(CalendarDate, InstanceStatus)]) -> Vec<LedgerConsistencyWarning> {
        let mut seen: HashMap<CalendarDate, InstanceStatus> = HashMap::with_capacity(writes.len());
        let mut conflicted: Vec<CalendarDate> = Vec::new();

        for &(date, status) in writes {
            if let Some(previous) = seen.insert(date, status) {
                let crossed = matches!(
                    (previous, status),
                    (InstanceStatus::Completed, InstanceStatus::Skipped)
                        | (InstanceStatus::Skipped, InstanceStatus::Completed)
                );
                if crossed && !conflicted.contains(&date) {
                    conflicted.push(date);
                }
            }
            self.mark(date, status);
        }

        conflicted
            .into_iter()
            .map(|date| {
                let warning = LedgerConsistencyWarning {
                    date,
                    kept: self.status_of(date),
                };
                warn!(%warning, "conflicting instance writes");
                warning
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.skipped.is_empty()
    }

    pub fn completed(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.completed.iter().copied()
    }

    pub fn skipped(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.skipped.iter().copied()
    }

    pub fn completed_instances(&self) -> Vec<String> {
        self.completed.iter().map(CalendarDate::to_string).collect()
    }

    pub fn skipped_instances(&self) -> Vec<String> {
        self.skipped.iter().map(CalendarDate::to_string).collect()
    }

    /// First occurrence of `rule` on or after `from` that is still pending.
    ///
    /// Scans strictly forward from `from` (not from the anchor), so it never
    /// passes over an earlier pending date. Gives up two years past the first
    /// candidate.
    pub fn next_pending_on_or_after(
        &self,
        rule: &RecurrenceRule,
        from: CalendarDate,
    ) -> Option<CalendarDate> {
        let mut occurrences = rule.occurrences_from(from);
        let first = occurrences.next()?;
        let horizon = first.saturating_add_days(PENDING_SCAN_HORIZON_DAYS);

        std::iter::once(first)
            .chain(occurrences)
            .take_while(|date| *date <= horizon)
            .take(PENDING_SCAN_LIMIT)
            .find(|date| self.status_of(*date) == InstanceStatus::Pending)
    }

    /// Drops entries dated before `cutoff`, keeping the newest entry of each
    /// set. Returns how many were removed. Only runs when called.
    pub fn prune_older_than(&mut self, cutoff: CalendarDate) -> usize {
        prune_set(&mut self.completed, cutoff) + prune_set(&mut self.skipped, cutoff)
    }
}

fn prune_set(set: &mut BTreeSet<CalendarDate>, cutoff: CalendarDate) -> usize {
    let newest = set.last().copied();
    let before = set.len();
    set.retain(|date| *date >= cutoff || Some(*date) == newest);
    before - set.len()
}

fn parse_instance_date(raw: &str) -> Option<CalendarDate> {
    raw.parse::<CalendarDate>()
        .ok()
        .or_else(|| raw.parse::<TaskDate>().ok().map(|value| value.date))
}
