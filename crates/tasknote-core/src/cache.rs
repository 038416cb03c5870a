use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{DateRange, TaskOccurrenceView, TaskRecord};

/// Ranges kept per task unless configured otherwise.
pub const DEFAULT_RANGES_PER_TASK: usize = 8;

/// Everything cached for one task. All ranges share the fingerprint they were
/// expanded under.
#[derive(Debug, Clone)]
struct TaskEntries {
    fingerprint: u64,
    /// Oldest insert first.
    ranges: VecDeque<(DateRange, Arc<Vec<TaskOccurrenceView>>)>,
}

/// Expanded occurrences per task and range.
///
/// Entries carry a fingerprint of the fields expansion depends on, so a task
/// edited behind the cache's back is a miss rather than a stale hit, and the
/// first insert under a new fingerprint drops every range of the old one.
/// Each task keeps at most `ranges_per_task` ranges; the oldest insert goes
/// first. Nothing expires on a timer.
#[derive(Debug)]
pub struct OccurrenceCache {
    tasks: RwLock<HashMap<Uuid, TaskEntries>>,
    ranges_per_task: usize,
}

impl Default for OccurrenceCache {
    fn default() -> Self {
        Self::with_range_limit(DEFAULT_RANGES_PER_TASK)
    }
}

impl OccurrenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache keeping at most `ranges_per_task` ranges per task (minimum one).
    pub fn with_range_limit(ranges_per_task: usize) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            ranges_per_task: ranges_per_task.max(1),
        }
    }

    pub fn get(
        &self,
        task_id: Uuid,
        range: DateRange,
        fingerprint: u64,
    ) -> Option<Arc<Vec<TaskOccurrenceView>>> {
        let tasks = self.tasks.read();
        let entries = tasks.get(&task_id).filter(|entries| entries.fingerprint == fingerprint)?;
        entries
            .ranges
            .iter()
            .find(|(cached, _)| *cached == range)
            .map(|(_, occurrences)| Arc::clone(occurrences))
    }

    /// Stores `occurrences`, replacing any previous entry for the range whole.
    /// A fingerprint that differs from the task's cached one discards all of
    /// the task's other ranges first.
    pub fn insert(
        &self,
        task_id: Uuid,
        range: DateRange,
        fingerprint: u64,
        occurrences: Vec<TaskOccurrenceView>,
    ) -> Arc<Vec<TaskOccurrenceView>> {
        let occurrences = Arc::new(occurrences);
        let mut tasks = self.tasks.write();
        let entries = tasks.entry(task_id).or_insert_with(|| TaskEntries {
            fingerprint,
            ranges: VecDeque::new(),
        });

        if entries.fingerprint != fingerprint {
            entries.fingerprint = fingerprint;
            entries.ranges.clear();
        }
        entries.ranges.retain(|(cached, _)| *cached != range);
        entries.ranges.push_back((range, Arc::clone(&occurrences)));
        while entries.ranges.len() > self.ranges_per_task {
            entries.ranges.pop_front();
        }

        occurrences
    }

    /// Drops every entry of `task_id`. Returns how many were dropped.
    pub fn invalidate_task(&self, task_id: Uuid) -> usize {
        self.tasks
            .write()
            .remove(&task_id)
            .map_or(0, |entries| entries.ranges.len())
    }

    pub fn clear(&self) {
        self.tasks.write().clear();
    }

    /// Cached ranges across all tasks.
    pub fn len(&self) -> usize {
        self.tasks.read().values().map(|entries| entries.ranges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash of everything occurrence expansion reads from a task.
pub fn fingerprint(task: &TaskRecord) -> u64 {
    let mut hasher = DefaultHasher::new();
    task.recurrence_rule.hash(&mut hasher);
    task.scheduled.hash(&mut hasher);
    task.due.hash(&mut hasher);
    task.completed_instances.hash(&mut hasher);
    task.skipped_instances.hash(&mut hasher);
    hasher.finish()
}
