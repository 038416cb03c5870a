//! Turning stored tasks into displayable calendar events for a date range.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{fingerprint, OccurrenceCache};
use crate::date::CalendarDate;
use crate::error::CoreError;
use crate::models::{
    CalendarEvent, DateRange, EventKind, InstanceStatus, TaskOccurrenceView, TaskRecord,
    TimeCategory, TimeEntry,
};
use crate::recurrence::RecurrenceManager;
use crate::resolver::{self, OccurrenceAction, OccurrenceUpdate};
use crate::timezone::{calendar_date_in, TaskDate};

/// Which event kinds to emit. Every toggle is independent of the others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MaterializeOptions {
    pub show_scheduled: bool,
    pub show_due: bool,
    pub show_recurring: bool,
    pub show_time_entries: bool,
    pub show_completed_instances: bool,
    pub show_skipped_instances: bool,
    /// Zone for floating times and for placing time entries on days.
    #[serde(skip)]
    pub timezone: Tz,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            show_scheduled: true,
            show_due: true,
            show_recurring: true,
            show_time_entries: true,
            show_completed_instances: true,
            show_skipped_instances: true,
            timezone: Tz::UTC,
        }
    }
}

impl MaterializeOptions {
    fn shows_status(&self, status: InstanceStatus) -> bool {
        match status {
            InstanceStatus::Pending => true,
            InstanceStatus::Completed => self.show_completed_instances,
            InstanceStatus::Skipped => self.show_skipped_instances,
        }
    }
}

/// Default calendar window around today.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MaterializationConfig {
    /// Days after today included when no explicit end is given.
    pub lookahead_days: u32,
    /// Days before today included when no explicit start is given.
    pub grace_days: u32,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 30,
            grace_days: 3,
        }
    }
}

impl MaterializationConfig {
    /// `[today - grace_days, today + lookahead_days]`, narrowed by explicit
    /// bounds when given.
    pub fn window(
        &self,
        today: CalendarDate,
        from: Option<CalendarDate>,
        to: Option<CalendarDate>,
    ) -> Result<DateRange, CoreError> {
        let start = from.unwrap_or_else(|| today.saturating_add_days(-i64::from(self.grace_days)));
        let end = to.unwrap_or_else(|| today.saturating_add_days(i64::from(self.lookahead_days)));
        Ok(DateRange::new(start, end)?)
    }
}

/// Statistics collected during a materialization call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializationSummary {
    /// Number of tasks looked at
    pub tasks_processed: usize,
    /// Total events emitted
    pub events_created: usize,
    /// Number of tasks that had unreadable fields
    pub tasks_with_errors: usize,
    /// Detailed error messages
    pub errors: Vec<String>,
    /// Time taken for the operation
    pub duration_ms: u64,
}

/// CalendarMaterializer: builds calendar events from task records.
///
/// Responsibilities:
/// 1. Expand recurring tasks over the requested range and annotate each date
///    with its ledger status
/// 2. Emit scheduled and due events for non-recurring tasks
/// 3. Emit closed time entries at their real timestamps
/// 4. Route occurrence updates so cached expansions are invalidated
///
/// One bad task never aborts a call: its unreadable parts are reported in the
/// summary and logged once per task for the life of the materializer.
#[derive(Debug, Default)]
pub struct CalendarMaterializer {
    cache: Option<OccurrenceCache>,
    reported: Mutex<HashSet<Uuid>>,
}

impl CalendarMaterializer {
    /// Creates a materializer that expands on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a materializer that keeps expansions per `(task, range)`.
    pub fn with_cache() -> Self {
        Self {
            cache: Some(OccurrenceCache::new()),
            reported: Mutex::new(HashSet::new()),
        }
    }

    pub fn cache(&self) -> Option<&OccurrenceCache> {
        self.cache.as_ref()
    }

    /// Events for every task inside `range`, sorted by start then title.
    pub fn materialize(
        &self,
        tasks: &[TaskRecord],
        range: DateRange,
        options: &MaterializeOptions,
        today: CalendarDate,
    ) -> Vec<CalendarEvent> {
        self.materialize_with_summary(tasks, range, options, today).0
    }

    /// Same as [`Self::materialize`], plus a summary of what happened.
    #[tracing::instrument(
        skip_all,
        fields(tasks = tasks.len(), start = %range.start, end = %range.end)
    )]
    pub fn materialize_with_summary(
        &self,
        tasks: &[TaskRecord],
        range: DateRange,
        options: &MaterializeOptions,
        today: CalendarDate,
    ) -> (Vec<CalendarEvent>, MaterializationSummary) {
        let started = Instant::now();
        let mut summary = MaterializationSummary::default();
        let mut events = Vec::new();

        for task in tasks {
            summary.tasks_processed += 1;
            let errors = self.task_events(task, range, options, today, &mut events);
            if !errors.is_empty() {
                summary.tasks_with_errors += 1;
                for err in &errors {
                    summary.errors.push(format!("{}: {}", task.title, err));
                }
                self.report_once(task, &errors);
            }
        }

        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
        summary.events_created = events.len();
        summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(events = summary.events_created, "materialized calendar");

        (events, summary)
    }

    /// Resolves and records an occurrence action, dropping the task's cached
    /// expansions. See [`resolver::mark_occurrence`].
    pub fn mark_occurrence(
        &self,
        task: &TaskRecord,
        action: OccurrenceAction,
        explicit: Option<CalendarDate>,
        today: CalendarDate,
    ) -> Result<OccurrenceUpdate, CoreError> {
        let update = resolver::mark_occurrence(task, action, explicit, today)?;
        self.invalidate_task(task.id);
        Ok(update)
    }

    pub fn invalidate_task(&self, task_id: Uuid) {
        if let Some(cache) = &self.cache {
            let dropped = cache.invalidate_task(task_id);
            debug!(%task_id, dropped, "invalidated cached occurrences");
        }
    }

    /// Appends the task's events; returns the errors met on the way.
    fn task_events(
        &self,
        task: &TaskRecord,
        range: DateRange,
        options: &MaterializeOptions,
        today: CalendarDate,
        events: &mut Vec<CalendarEvent>,
    ) -> Vec<CoreError> {
        let mut errors = Vec::new();

        let recurrence = if task.is_recurring() {
            match self.occurrences(task, range) {
                Ok(found) => Some(found),
                Err(err) => {
                    errors.push(err);
                    None
                }
            }
        } else {
            None
        };

        match recurrence {
            Some((occurrences, anchor)) => {
                if options.show_recurring {
                    events.extend(
                        occurrences
                            .iter()
                            .filter(|view| options.shows_status(view.status))
                            .map(|view| recurring_event(task, view, anchor.as_ref(), options, today)),
                    );
                }
            }
            None => {
                if options.show_scheduled {
                    match task.scheduled_date() {
                        Ok(Some(value)) if range.contains(value.date) => events.push(dated_event(
                            task,
                            EventKind::ScheduledDate,
                            &value,
                            options,
                            today,
                        )),
                        Ok(_) => {}
                        Err(err) => errors.push(err),
                    }
                }
                if options.show_due {
                    match task.due_date() {
                        Ok(Some(value)) if range.contains(value.date) => events.push(dated_event(
                            task,
                            EventKind::DueDate,
                            &value,
                            options,
                            today,
                        )),
                        Ok(_) => {}
                        Err(err) => errors.push(err),
                    }
                }
            }
        }

        if options.show_time_entries {
            events.extend(
                task.time_entries
                    .iter()
                    .filter(|entry| time_entry_overlaps(entry, range, &options.timezone))
                    .filter_map(|entry| time_entry_event(task, entry)),
            );
        }

        errors
    }

    /// Occurrences in `range` plus the task's anchor value, from the cache when
    /// the task is unchanged.
    fn occurrences(
        &self,
        task: &TaskRecord,
        range: DateRange,
    ) -> Result<(Arc<Vec<TaskOccurrenceView>>, Option<TaskDate>), CoreError> {
        let Some(cache) = &self.cache else {
            let manager = RecurrenceManager::from_record(task)?;
            let views = manager.generate_occurrences_between(range);
            return Ok((Arc::new(views), manager.anchor().copied()));
        };

        let key = fingerprint(task);
        if let Some(hit) = cache.get(task.id, range, key) {
            debug!(task_id = %task.id, "occurrence cache hit");
            return Ok((hit, task.anchor_date()?));
        }

        let manager = RecurrenceManager::from_record(task)?;
        let views = manager.generate_occurrences_between(range);
        debug!(task_id = %task.id, occurrences = views.len(), "occurrence cache miss");
        Ok((cache.insert(task.id, range, key, views), manager.anchor().copied()))
    }

    fn report_once(&self, task: &TaskRecord, errors: &[CoreError]) {
        if !self.reported.lock().insert(task.id) {
            return;
        }
        for err in errors {
            warn!(
                task_id = %task.id,
                title = %task.title,
                error = %err,
                "task partially excluded from calendar"
            );
        }
    }
}

fn recurring_event(
    task: &TaskRecord,
    view: &TaskOccurrenceView,
    anchor: Option<&TaskDate>,
    options: &MaterializeOptions,
    today: CalendarDate,
) -> CalendarEvent {
    let value = match anchor {
        Some(anchor) => anchor.with_date(view.date),
        None => TaskDate::all_day(view.date),
    };
    let (start, end) = event_bounds(&value, options);
    CalendarEvent {
        id: event_id(EventKind::RecurringInstance, task.id, view.date),
        task_id: task.id,
        title: task.title.clone(),
        start,
        end,
        all_day: value.is_all_day(),
        kind: EventKind::RecurringInstance,
        status: Some(view.status),
        time_category: Some(TimeCategory::classify(view.date, today)),
    }
}

fn dated_event(
    task: &TaskRecord,
    kind: EventKind,
    value: &TaskDate,
    options: &MaterializeOptions,
    today: CalendarDate,
) -> CalendarEvent {
    let (start, end) = event_bounds(value, options);
    CalendarEvent {
        id: event_id(kind, task.id, value.date),
        task_id: task.id,
        title: task.title.clone(),
        start,
        end,
        all_day: value.is_all_day(),
        kind,
        status: None,
        time_category: Some(TimeCategory::classify(value.date, today)),
    }
}

/// All-day values span their whole day; timed values are points.
fn event_bounds(value: &TaskDate, options: &MaterializeOptions) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    if value.is_all_day() {
        (
            value.date.to_utc_midnight(),
            Some(value.date.succ().to_utc_midnight()),
        )
    } else {
        (value.start_instant(&options.timezone), None)
    }
}

fn time_entry_overlaps(entry: &TimeEntry, range: DateRange, tz: &Tz) -> bool {
    let Some(end) = entry.end else {
        return false;
    };
    let first_day = calendar_date_in(&entry.start.with_timezone(tz));
    let last_day = calendar_date_in(&end.with_timezone(tz));
    range.overlaps(first_day, last_day)
}

fn time_entry_event(task: &TaskRecord, entry: &TimeEntry) -> Option<CalendarEvent> {
    let end = entry.end?;
    Some(CalendarEvent {
        id: format!(
            "{}-{}-{}",
            EventKind::TimeEntry,
            task.id,
            entry.start.format("%Y-%m-%dT%H:%M:%SZ")
        ),
        task_id: task.id,
        title: task.title.clone(),
        start: entry.start,
        end: Some(end),
        all_day: false,
        kind: EventKind::TimeEntry,
        status: None,
        time_category: None,
    })
}

fn event_id(kind: EventKind, task_id: Uuid, date: CalendarDate) -> String {
    format!("{}-{}-{}", kind, task_id, date)
}
