use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;
use tasknote_core::error::CoreError;
use tasknote_core::materialization::{MaterializationConfig, MaterializeOptions};
use tasknote_core::timezone::validate_timezone;

const CONFIG_FILE: &str = "tasknote.toml";

#[derive(Deserialize, Debug)]
pub struct Config {
    /// JSON file holding the task records
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,
    /// User's timezone (IANA format)
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Calendar defaults: the window around today and which events to show
#[derive(Deserialize, Debug, Default)]
pub struct CalendarConfig {
    #[serde(flatten)]
    pub window: MaterializationConfig,
    #[serde(flatten)]
    pub display: MaterializeOptions,
}

impl Config {
    /// Loads `tasknote.toml` (or the file named by `TASKNOTE_CONFIG`), then
    /// `TASKNOTE_*` environment variables on top.
    pub fn new() -> Result<Self, figment::Error> {
        let file = std::env::var("TASKNOTE_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(file))
                .merge(Env::prefixed("TASKNOTE_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    pub fn tz(&self) -> Result<Tz, CoreError> {
        validate_timezone(&self.timezone)
    }
}

fn default_tasks_file() -> PathBuf {
    PathBuf::from("tasks.json")
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    // Method 1: Check TZ environment variable
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    // Method 2: Ask the platform
    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    // Fallback to UTC
    "UTC".to_string()
}
