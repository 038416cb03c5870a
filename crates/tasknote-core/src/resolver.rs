//! Deciding which occurrence a complete/skip action applies to, and where the
//! task's visible anchor moves afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::date::CalendarDate;
use crate::error::CoreError;
use crate::ledger::InstanceLedger;
use crate::models::{InstanceStatus, TaskRecord};
use crate::recurrence::RecurrenceManager;

/// What to record against the resolved occurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceAction {
    Complete,
    Skip,
}

impl OccurrenceAction {
    pub fn status(self) -> InstanceStatus {
        match self {
            OccurrenceAction::Complete => InstanceStatus::Completed,
            OccurrenceAction::Skip => InstanceStatus::Skipped,
        }
    }
}

impl fmt::Display for OccurrenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceAction::Complete => write!(f, "complete"),
            OccurrenceAction::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid occurrence action: {0}")]
pub struct ParseOccurrenceActionError(String);

impl FromStr for OccurrenceAction {
    type Err = ParseOccurrenceActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" | "done" => Ok(OccurrenceAction::Complete),
            "skip" => Ok(OccurrenceAction::Skip),
            _ => Err(ParseOccurrenceActionError(s.to_string())),
        }
    }
}

/// Picks the occurrence date an action applies to.
///
/// An explicit date always wins. Otherwise an overdue anchor that is still
/// pending is the target, so the oldest missed occurrence gets resolved first.
/// Anything else targets `today`.
pub fn resolve_target(
    explicit: Option<CalendarDate>,
    anchor: Option<CalendarDate>,
    ledger: &InstanceLedger,
    today: CalendarDate,
) -> CalendarDate {
    if let Some(date) = explicit {
        return date;
    }
    match anchor {
        Some(anchor) if anchor < today && ledger.status_of(anchor) == InstanceStatus::Pending => {
            anchor
        }
        _ => today,
    }
}

/// Result of [`mark_occurrence`]: the new ledger and anchor, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceUpdate {
    pub ledger: InstanceLedger,
    pub target: CalendarDate,
    /// `None` once the series has no pending occurrence left in reach.
    pub next_anchor: Option<CalendarDate>,
    /// Canonical rule text with its DTSTART spelled out, set when the stored
    /// rule relied on the task's date as anchor. Moving that date would
    /// otherwise move the series with it.
    pub pinned_rule: Option<String>,
}

impl OccurrenceUpdate {
    /// Writes the update into `task`.
    ///
    /// The instance lists are replaced wholesale and an unanchored rule gets
    /// its DTSTART pinned. The displayed date moves to
    /// `next_anchor`: `scheduled` if the task has one, else `due`, else a new
    /// all-day `scheduled`. A time-of-day suffix on the old value is kept.
    pub fn apply_to(&self, task: &mut TaskRecord) -> Result<(), CoreError> {
        task.completed_instances = self.ledger.completed_instances();
        task.skipped_instances = self.ledger.skipped_instances();
        if let Some(rule) = &self.pinned_rule {
            task.recurrence_rule = Some(rule.clone());
        }

        let Some(next) = self.next_anchor else {
            return Ok(());
        };
        if let Some(scheduled) = task.scheduled_date()? {
            task.scheduled = Some(scheduled.with_date(next).to_string());
        } else if let Some(due) = task.due_date()? {
            task.due = Some(due.with_date(next).to_string());
        } else {
            task.scheduled = Some(next.to_string());
        }
        Ok(())
    }
}

/// Records a completion or skip against a recurring task.
///
/// Works on a copy of the task's ledger; `task` itself is never touched, so a
/// caller that fails to persist simply drops the returned update.
///
/// # Behavior
/// - The target comes from [`resolve_target`]
/// - An explicit date must be an occurrence of the rule
/// - A resolved target that is not an occurrence (an anchor off the rule's
///   weekdays, or a `today` between occurrences) moves to the first pending
///   occurrence on or after it, so the ledger only ever holds real occurrences
/// - The next anchor is the first pending occurrence after the target, except
///   that acting on some other explicit date leaves a different current
///   anchor in place while it is still pending
pub fn mark_occurrence(
    task: &TaskRecord,
    action: OccurrenceAction,
    explicit: Option<CalendarDate>,
    today: CalendarDate,
) -> Result<OccurrenceUpdate, CoreError> {
    let manager = RecurrenceManager::from_record(task)?;
    let rule = manager.rule();
    let anchor = manager.anchor().map(|value| value.date);

    if let Some(date) = explicit {
        if !rule.is_occurrence(date) {
            return Err(CoreError::InvalidInput(format!(
                "{} is not an occurrence of '{}'",
                date, task.title
            )));
        }
    }

    let mut target = resolve_target(explicit, anchor, manager.ledger(), today);
    if explicit.is_none() && !rule.is_occurrence(target) {
        target = manager
            .ledger()
            .next_pending_on_or_after(rule, target)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "'{}' has no pending occurrence on or after {}",
                    task.title, target
                ))
            })?;
    }
    let mut ledger = manager.ledger().clone();
    ledger.mark(target, action.status());

    let scan_from = match (explicit, anchor) {
        (Some(_), Some(current)) if current != target => current,
        _ => target.succ(),
    };
    let next_anchor = ledger.next_pending_on_or_after(rule, scan_from);

    debug!(
        task_id = %task.id,
        %action,
        %target,
        next_anchor = ?next_anchor,
        "resolved occurrence"
    );

    let pinned_rule = task
        .recurrence_rule
        .as_deref()
        .filter(|raw| !raw.to_ascii_uppercase().contains("DTSTART"))
        .map(|_| rule.to_string());

    Ok(OccurrenceUpdate {
        ledger,
        target,
        next_anchor,
        pinned_rule,
    })
}
