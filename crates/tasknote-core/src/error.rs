use crate::date::CalendarDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Rule(#[from] RecurrenceRuleError),

    #[error("{0}")]
    Range(#[from] RangeError),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Task '{0}' has no recurrence rule")]
    NotRecurring(String),

    #[error("Ambiguous task reference. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, title)
}

/// Raised while parsing a rule string. A task whose rule fails to parse is
/// treated as non-recurring by the materializer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRuleError {
    #[error("Unsupported recurrence rule: {0}")]
    UnsupportedFrequency(String),

    #[error("Malformed recurrence anchor: {0}")]
    MalformedAnchor(String),

    #[error("Invalid recurrence interval: {0}")]
    InvalidInterval(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range end {end} is before range start {start}")]
    EndBeforeStart {
        start: CalendarDate,
        end: CalendarDate,
    },
}

/// Non-fatal: the same date was written as both completed and skipped in one
/// batch. The last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConsistencyWarning {
    pub date: CalendarDate,
    pub kept: crate::models::InstanceStatus,
}

impl std::fmt::Display for LedgerConsistencyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} was marked both completed and skipped; keeping {}",
            self.date, self.kept
        )
    }
}
