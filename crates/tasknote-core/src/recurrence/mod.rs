//! Recurrence rules and their expansion into calendar dates.

pub mod expander;
pub mod rule;

pub use expander::{expand, Occurrences};
pub use rule::{Frequency, RecurrenceRule};

use tracing::warn;
use uuid::Uuid;

use crate::date::CalendarDate;
use crate::error::{CoreError, RecurrenceRuleError};
use crate::ledger::InstanceLedger;
use crate::models::{DateRange, TaskOccurrenceView, TaskRecord};
use crate::timezone::TaskDate;

/// How far ahead [`RecurrenceManager::preview_occurrences`] looks.
const PREVIEW_HORIZON_DAYS: i64 = 365;

/// RecurrenceManager: recurrence view of a single recurring task.
///
/// Responsibilities:
/// 1. Parse the task's rule, falling back to its scheduled or due date as anchor
/// 2. Load the per-instance ledger from the task's persisted lists
/// 3. Pair generated occurrence dates with their ledger status
/// 4. Provide occurrence preview functionality
#[derive(Debug, Clone)]
pub struct RecurrenceManager {
    task_id: Uuid,
    rule: RecurrenceRule,
    ledger: InstanceLedger,
    /// Scheduled value, else due value. Carries the time-of-day for timed
    /// instances.
    anchor: Option<TaskDate>,
}

impl RecurrenceManager {
    /// Creates a RecurrenceManager from a stored task.
    ///
    /// # Returns
    /// * `Result<Self, CoreError>` - `NotRecurring` when the task has no rule,
    ///   `Rule` when the rule does not parse
    ///
    /// # Behavior
    /// - The rule's own DTSTART wins over the task's dates
    /// - Ledger entries that fail to parse are dropped and logged
    pub fn from_record(task: &TaskRecord) -> Result<Self, CoreError> {
        let raw_rule = task
            .recurrence_rule
            .as_deref()
            .filter(|rule| !rule.trim().is_empty())
            .ok_or_else(|| CoreError::NotRecurring(task.title.clone()))?;

        let anchor = task.anchor_date()?;
        let rule = RecurrenceRule::parse(raw_rule, anchor.map(|value| value.date))?;
        let (ledger, _warnings) =
            InstanceLedger::from_serialized(&task.completed_instances, &task.skipped_instances);

        Ok(Self {
            task_id: task.id,
            rule,
            ledger,
            anchor,
        })
    }

    pub fn new(task_id: Uuid, rule: RecurrenceRule, ledger: InstanceLedger) -> Self {
        Self {
            task_id,
            rule,
            ledger,
            anchor: None,
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn ledger(&self) -> &InstanceLedger {
        &self.ledger
    }

    pub fn anchor(&self) -> Option<&TaskDate> {
        self.anchor.as_ref()
    }

    /// Every occurrence inside `range`, each with its ledger status.
    pub fn generate_occurrences_between(&self, range: DateRange) -> Vec<TaskOccurrenceView> {
        match expand(&self.rule, range.start, range.end) {
            Ok(dates) => dates.into_iter().map(|date| self.view(date)).collect(),
            Err(err) => {
                // DateRange already rules this out.
                warn!(task_id = %self.task_id, error = %err, "skipping expansion");
                Vec::new()
            }
        }
    }

    /// First pending occurrence strictly after `after`.
    pub fn next_occurrence_after(&self, after: CalendarDate) -> Option<CalendarDate> {
        self.ledger.next_pending_on_or_after(&self.rule, after.succ())
    }

    /// Up to `count` upcoming occurrences from `from`, resolved ones included,
    /// looking at most a year ahead.
    pub fn preview_occurrences(&self, from: CalendarDate, count: usize) -> Vec<TaskOccurrenceView> {
        let horizon = from.saturating_add_days(PREVIEW_HORIZON_DAYS);
        self.rule
            .occurrences_from(from)
            .take_while(|date| *date <= horizon)
            .take(count)
            .map(|date| self.view(date))
            .collect()
    }

    fn view(&self, date: CalendarDate) -> TaskOccurrenceView {
        TaskOccurrenceView {
            date,
            status: self.ledger.status_of(date),
        }
    }
}

/// Validates a rule string without keeping it.
pub fn validate_rule(text: &str, fallback_anchor: Option<CalendarDate>) -> Result<(), RecurrenceRuleError> {
    RecurrenceRule::parse(text, fallback_anchor).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstanceStatus;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn daily_task() -> TaskRecord {
        TaskRecord {
            title: "Stretch".to_string(),
            recurrence_rule: Some("FREQ=DAILY".to_string()),
            scheduled: Some("2025-01-01T07:30".to_string()),
            completed_instances: vec!["2025-01-02".to_string()],
            skipped_instances: vec!["2025-01-03".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_from_record_uses_scheduled_as_anchor() {
        let manager = RecurrenceManager::from_record(&daily_task()).unwrap();
        assert_eq!(manager.rule().anchor(), date(2025, 1, 1));
        assert!(manager.anchor().is_some_and(|anchor| !anchor.is_all_day()));
    }

    #[test]
    fn test_dtstart_wins_over_scheduled() {
        let task = TaskRecord {
            recurrence_rule: Some("DTSTART:20241230;FREQ=DAILY".to_string()),
            ..daily_task()
        };
        let manager = RecurrenceManager::from_record(&task).unwrap();
        assert_eq!(manager.rule().anchor(), date(2024, 12, 30));
    }

    #[test]
    fn test_from_record_errors() {
        let plain = TaskRecord {
            title: "One-off".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RecurrenceManager::from_record(&plain),
            Err(CoreError::NotRecurring(_))
        ));

        let bad = TaskRecord {
            recurrence_rule: Some("FREQ=HOURLY".to_string()),
            ..daily_task()
        };
        assert!(matches!(
            RecurrenceManager::from_record(&bad),
            Err(CoreError::Rule(RecurrenceRuleError::UnsupportedFrequency(_)))
        ));

        let unanchored = TaskRecord {
            recurrence_rule: Some("FREQ=DAILY".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RecurrenceManager::from_record(&unanchored),
            Err(CoreError::Rule(RecurrenceRuleError::MalformedAnchor(_)))
        ));
    }

    #[test]
    fn test_generate_occurrences_between_carries_status() {
        let manager = RecurrenceManager::from_record(&daily_task()).unwrap();
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 4)).unwrap();
        let statuses: Vec<InstanceStatus> = manager
            .generate_occurrences_between(range)
            .into_iter()
            .map(|view| view.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                InstanceStatus::Pending,
                InstanceStatus::Completed,
                InstanceStatus::Skipped,
                InstanceStatus::Pending,
            ]
        );
    }

    #[test]
    fn test_next_occurrence_after_passes_resolved() {
        let manager = RecurrenceManager::from_record(&daily_task()).unwrap();
        assert_eq!(manager.next_occurrence_after(date(2025, 1, 1)), Some(date(2025, 1, 4)));
    }

    #[test]
    fn test_preview_occurrences_respects_count() {
        let manager = RecurrenceManager::from_record(&daily_task()).unwrap();
        let preview = manager.preview_occurrences(date(2025, 1, 2), 3);
        assert_eq!(preview.len(), 3);
        assert_eq!(preview[0].status, InstanceStatus::Completed);
        assert_eq!(preview[2].date, date(2025, 1, 4));
    }

    #[test]
    fn test_validate_rule() {
        assert!(validate_rule("FREQ=WEEKLY;BYDAY=MO", Some(date(2025, 1, 6))).is_ok());
        assert!(validate_rule("FREQ=WEEKLY;INTERVAL=-2", Some(date(2025, 1, 6))).is_err());
    }
}
