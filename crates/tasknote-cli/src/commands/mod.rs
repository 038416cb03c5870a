pub mod calendar;
pub mod expand;
pub mod next;
pub mod occurrence;
pub mod prune;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tasknote_core::date::CalendarDate;
use tasknote_core::timezone::{calendar_date_in, validate_timezone};

use crate::config::Config;
use crate::parser::parse_calendar_date;
use crate::store::TaskStore;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub config: Config,
    pub store: TaskStore,
    pub tz: Tz,
    pub now: DateTime<Tz>,
    pub today: CalendarDate,
}

impl Context {
    /// Applies the global flags on top of the loaded config. "Today" is
    /// decided here, once, in the configured zone.
    pub fn new(
        config: Config,
        file: Option<std::path::PathBuf>,
        timezone: Option<&str>,
        today: Option<&str>,
    ) -> Result<Self> {
        let tz = match timezone {
            Some(name) => validate_timezone(name)?,
            None => config.tz()?,
        };
        let now = Utc::now().with_timezone(&tz);
        let today = match today {
            Some(raw) => parse_calendar_date(raw, now)?,
            None => calendar_date_in(&now),
        };
        let store = TaskStore::new(file.unwrap_or_else(|| config.tasks_file.clone()));

        Ok(Self {
            config,
            store,
            tz,
            now,
            today,
        })
    }

    pub fn parse_date(&self, input: &str) -> Result<CalendarDate> {
        parse_calendar_date(input, self.now)
    }
}
