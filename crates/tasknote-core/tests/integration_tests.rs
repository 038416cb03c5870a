use chrono::{TimeZone, Utc};
use tasknote_core::date::CalendarDate;
use tasknote_core::ledger::InstanceLedger;
use tasknote_core::materialization::{CalendarMaterializer, MaterializeOptions};
use tasknote_core::models::*;
use tasknote_core::resolver::OccurrenceAction;

fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    CalendarDate::from_ymd(y, m, d).unwrap()
}

/// Helper function to load tasks the way the storage layer hands them over
fn load_tasks(json: &str) -> Vec<TaskRecord> {
    serde_json::from_str(json).expect("Failed to parse test tasks")
}

const TASKS: &str = r#"[
    {
        "id": "0190c6a2-7a4e-7c11-9b3b-3f0e1f2d4a5b",
        "title": "Water plants",
        "recurrenceRule": "FREQ=DAILY;INTERVAL=2",
        "scheduled": "2025-01-04",
        "completedInstances": ["2025-01-02"],
        "timeEntries": [
            {"start": "2025-01-02T07:00:00Z", "end": "2025-01-02T07:10:00Z"},
            {"start": "2025-01-09T07:00:00Z"}
        ]
    },
    {
        "id": "0190c6a2-7a4e-7c11-9b3b-3f0e1f2d4a5c",
        "title": "File taxes",
        "due": "2025-01-15"
    },
    {
        "id": "0190c6a2-7a4e-7c11-9b3b-3f0e1f2d4a5d",
        "title": "Broken rule",
        "recurrenceRule": "FREQ=SECONDLY",
        "scheduled": "2025-01-08T10:00"
    }
]"#;

#[test]
fn test_calendar_workflow() {
    let tasks = load_tasks(TASKS);
    let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 10)).unwrap();
    let today = date(2025, 1, 8);
    let materializer = CalendarMaterializer::with_cache();

    let (events, summary) =
        materializer.materialize_with_summary(&tasks, range, &MaterializeOptions::default(), today);

    assert_eq!(summary.tasks_processed, 3);
    assert_eq!(summary.tasks_with_errors, 1);

    let watering: Vec<CalendarDate> = events
        .iter()
        .filter(|event| event.kind == EventKind::RecurringInstance)
        .map(|event| CalendarDate::from_utc(event.start))
        .collect();
    assert_eq!(
        watering,
        vec![date(2025, 1, 4), date(2025, 1, 6), date(2025, 1, 8), date(2025, 1, 10)]
    );
    // 2025-01-02 predates the anchor, so its completion has no instance here.
    assert!(events
        .iter()
        .filter(|event| event.kind == EventKind::RecurringInstance)
        .all(|event| event.status == Some(InstanceStatus::Pending)));

    // The closed entry on Jan 2 shows up even though no instance falls there.
    let entries: Vec<&CalendarEvent> = events
        .iter()
        .filter(|event| event.kind == EventKind::TimeEntry)
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start, Utc.with_ymd_and_hms(2025, 1, 2, 7, 0, 0).unwrap());

    // Out of range due date, and a bad rule degrading to its scheduled date.
    assert!(!events.iter().any(|event| event.title == "File taxes"));
    let broken = events
        .iter()
        .find(|event| event.title == "Broken rule")
        .unwrap();
    assert_eq!(broken.kind, EventKind::ScheduledDate);
    assert_eq!(broken.time_category, Some(TimeCategory::Today));

    let starts: Vec<_> = events.iter().map(|event| event.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_complete_overdue_then_rematerialize() {
    let mut tasks = load_tasks(TASKS);
    let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 10)).unwrap();
    let today = date(2025, 1, 8);
    let materializer = CalendarMaterializer::with_cache();
    materializer.materialize(&tasks, range, &MaterializeOptions::default(), today);

    // Anchor Jan 4 is overdue and pending: it is the target.
    let update = materializer
        .mark_occurrence(&tasks[0], OccurrenceAction::Complete, None, today)
        .unwrap();
    assert_eq!(update.target, date(2025, 1, 4));
    assert_eq!(update.next_anchor, Some(date(2025, 1, 6)));
    update.apply_to(&mut tasks[0]).unwrap();

    let stored = serde_json::to_value(&tasks[0]).unwrap();
    assert_eq!(stored["scheduled"], "2025-01-06");
    assert_eq!(stored["recurrenceRule"], "DTSTART:20250104;FREQ=DAILY;INTERVAL=2");
    assert_eq!(
        stored["completedInstances"],
        serde_json::json!(["2025-01-02", "2025-01-04"])
    );

    let events = materializer.materialize(&tasks, range, &MaterializeOptions::default(), today);
    let statuses: Vec<(CalendarDate, Option<InstanceStatus>)> = events
        .iter()
        .filter(|event| event.kind == EventKind::RecurringInstance)
        .map(|event| (CalendarDate::from_utc(event.start), event.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (date(2025, 1, 4), Some(InstanceStatus::Completed)),
            (date(2025, 1, 6), Some(InstanceStatus::Pending)),
            (date(2025, 1, 8), Some(InstanceStatus::Pending)),
            (date(2025, 1, 10), Some(InstanceStatus::Pending)),
        ]
    );
}

#[test]
fn test_ledger_survives_storage_round_trip() {
    let mut ledger = InstanceLedger::new();
    ledger.mark_completed(date(2025, 1, 3));
    ledger.mark_skipped(date(2025, 1, 1));
    ledger.mark_completed(date(2025, 1, 2));

    let record = TaskRecord {
        title: "Round trip".to_string(),
        recurrence_rule: Some("FREQ=DAILY".to_string()),
        scheduled: Some("2025-01-01".to_string()),
        completed_instances: ledger.completed_instances(),
        skipped_instances: ledger.skipped_instances(),
        ..Default::default()
    };
    let json = serde_json::to_string(&record).unwrap();
    let restored: TaskRecord = serde_json::from_str(&json).unwrap();
    let (reloaded, warnings) =
        InstanceLedger::from_serialized(&restored.completed_instances, &restored.skipped_instances);

    assert!(warnings.is_empty());
    assert_eq!(reloaded, ledger);
}

#[test]
fn test_hidden_statuses_leave_other_events() {
    let tasks = load_tasks(TASKS);
    let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
    let options = MaterializeOptions {
        show_completed_instances: false,
        show_recurring: true,
        ..Default::default()
    };
    let events = CalendarMaterializer::new().materialize(&tasks, range, &options, date(2025, 1, 8));
    assert!(events.iter().any(|event| event.kind == EventKind::DueDate));
    assert!(events.iter().any(|event| event.kind == EventKind::TimeEntry));
}
