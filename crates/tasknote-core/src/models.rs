use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::date::CalendarDate;
use crate::error::CoreError;
use crate::timezone::TaskDate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" | "todo" => Ok(TaskStatus::Open),
            "done" | "completed" => Ok(TaskStatus::Done),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

/// Status of one occurrence of a recurring task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Completed,
    Skipped,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceStatus::Pending => write!(f, "pending"),
            InstanceStatus::Completed => write!(f, "completed"),
            InstanceStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// A logged span of work. Entries without an end are still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeEntry {
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

/// A task as the storage collaborator hands it over: raw frontmatter-style
/// fields, nothing parsed yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_instances: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_instances: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_entries: Vec<TimeEntry>,
}

impl Default for TaskRecord {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            title: String::new(),
            status: TaskStatus::Open,
            recurrence_rule: None,
            scheduled: None,
            due: None,
            completed_instances: Vec::new(),
            skipped_instances: Vec::new(),
            time_entries: Vec::new(),
        }
    }
}

impl TaskRecord {
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule
            .as_deref()
            .is_some_and(|rule| !rule.trim().is_empty())
    }

    pub fn scheduled_date(&self) -> Result<Option<TaskDate>, CoreError> {
        self.scheduled.as_deref().map(str::parse).transpose()
    }

    pub fn due_date(&self) -> Result<Option<TaskDate>, CoreError> {
        self.due.as_deref().map(str::parse).transpose()
    }

    /// The date the task currently displays: scheduled, falling back to due.
    pub fn anchor_date(&self) -> Result<Option<TaskDate>, CoreError> {
        match self.scheduled_date()? {
            Some(scheduled) => Ok(Some(scheduled)),
            None => self.due_date(),
        }
    }
}

/// One computed occurrence of a recurring task. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskOccurrenceView {
    pub date: CalendarDate,
    pub status: InstanceStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    RecurringInstance,
    ScheduledDate,
    DueDate,
    TimeEntry,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::RecurringInstance => write!(f, "recurring"),
            EventKind::ScheduledDate => write!(f, "scheduled"),
            EventKind::DueDate => write!(f, "due"),
            EventKind::TimeEntry => write!(f, "timeentry"),
        }
    }
}

/// Relative-urgency bucket of an event's day against today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TimeCategory {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    ThisMonth,
    Later,
}

impl TimeCategory {
    pub fn classify(date: CalendarDate, today: CalendarDate) -> Self {
        match today.days_until(date) {
            d if d < 0 => TimeCategory::Overdue,
            0 => TimeCategory::Today,
            1 => TimeCategory::Tomorrow,
            d if d <= 7 => TimeCategory::ThisWeek,
            d if d <= 30 => TimeCategory::ThisMonth,
            _ => TimeCategory::Later,
        }
    }
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeCategory::Overdue => "Overdue",
            TimeCategory::Today => "Today",
            TimeCategory::Tomorrow => "Tomorrow",
            TimeCategory::ThisWeek => "This week",
            TimeCategory::ThisMonth => "This month",
            TimeCategory::Later => "Later",
        };
        write!(f, "{}", label)
    }
}

/// A displayable calendar entry produced by materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub task_id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub kind: EventKind,
    /// Only set for recurring instances.
    pub status: Option<InstanceStatus>,
    /// Not set for time entries, which sit at their own timestamps.
    pub time_category: Option<TimeCategory>,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, crate::error::RangeError> {
        if end < start {
            return Err(crate::error::RangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `[from, to]` shares at least one day with this range.
    pub fn overlaps(&self, from: CalendarDate, to: CalendarDate) -> bool {
        from <= self.end && to >= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2025, 1, 9), TimeCategory::Overdue)]
    #[case(date(2025, 1, 10), TimeCategory::Today)]
    #[case(date(2025, 1, 11), TimeCategory::Tomorrow)]
    #[case(date(2025, 1, 12), TimeCategory::ThisWeek)]
    #[case(date(2025, 1, 17), TimeCategory::ThisWeek)]
    #[case(date(2025, 1, 18), TimeCategory::ThisMonth)]
    #[case(date(2025, 2, 9), TimeCategory::ThisMonth)]
    #[case(date(2025, 2, 10), TimeCategory::Later)]
    fn test_time_category_boundaries(#[case] event_day: CalendarDate, #[case] expected: TimeCategory) {
        assert_eq!(TimeCategory::classify(event_day, date(2025, 1, 10)), expected);
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Open);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_record_wire_format() {
        let json = r#"{
            "id": "0190c6a2-7a4e-7c11-9b3b-3f0e1f2d4a5b",
            "title": "Water plants",
            "recurrenceRule": "FREQ=DAILY",
            "scheduled": "2025-01-05",
            "completedInstances": ["2025-01-03", "2025-01-04"],
            "timeEntries": [{"start": "2025-01-04T08:00:00Z", "end": "2025-01-04T08:15:00Z"}]
        }"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_recurring());
        assert_eq!(record.status, TaskStatus::Open);
        assert_eq!(record.completed_instances.len(), 2);
        assert!(record.skipped_instances.is_empty());
        assert!(record.time_entries[0].is_closed());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["recurrenceRule"], "FREQ=DAILY");
        assert!(out.get("skippedInstances").is_none());
    }

    #[test]
    fn test_anchor_prefers_scheduled() {
        let record = TaskRecord {
            scheduled: Some("2025-01-05".to_string()),
            due: Some("2025-01-07".to_string()),
            ..Default::default()
        };
        assert_eq!(record.anchor_date().unwrap().unwrap().date, date(2025, 1, 5));

        let due_only = TaskRecord {
            due: Some("2025-01-07T17:00".to_string()),
            ..Default::default()
        };
        assert_eq!(due_only.anchor_date().unwrap().unwrap().date, date(2025, 1, 7));
    }

    #[test]
    fn test_date_range() {
        assert!(DateRange::new(date(2025, 1, 2), date(2025, 1, 1)).is_err());
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
        assert!(range.contains(date(2025, 1, 31)));
        assert!(!range.contains(date(2025, 2, 1)));
        assert!(range.overlaps(date(2024, 12, 31), date(2025, 1, 1)));
        assert!(!range.overlaps(date(2024, 12, 1), date(2024, 12, 31)));
    }
}
