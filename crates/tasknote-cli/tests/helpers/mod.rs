#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Day every test runs on, so overdue/today logic is deterministic.
pub const TODAY: &str = "2025-01-10";

/// Test harness for running CLI commands against a temporary tasks file
pub struct CliTestHarness {
    temp_dir: TempDir,
    tasks_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty temporary directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let tasks_path = temp_dir.path().join("tasks.json");

        Self {
            temp_dir,
            tasks_path,
        }
    }

    /// Create a harness whose tasks file starts with `json`
    pub fn with_tasks(json: &str) -> Self {
        let harness = Self::new();
        fs::write(&harness.tasks_path, json).expect("Failed to write tasks file");
        harness
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tasknote").expect("Failed to find tasknote binary");

        // Keep the user's config and zone out of the picture.
        cmd.current_dir(self.temp_dir.path());
        cmd.env("TASKNOTE_CONFIG", self.temp_dir.path().join("tasknote.toml"));
        cmd.env("TASKNOTE_TASKS_FILE", &self.tasks_path);
        cmd.env("TASKNOTE_TIMEZONE", "UTC");
        cmd.env_remove("TASKNOTE_LOG");
        cmd.args(["--today", TODAY]);

        cmd
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    /// Write a config file the next commands will pick up
    pub fn write_config(&self, toml: &str) {
        fs::write(self.temp_dir.path().join("tasknote.toml"), toml).expect("Failed to write config");
    }

    /// Current contents of the tasks file
    pub fn tasks(&self) -> serde_json::Value {
        let raw = fs::read_to_string(&self.tasks_path).expect("Failed to read tasks file");
        serde_json::from_str(&raw).expect("Tasks file is not valid JSON")
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Helper to run a command and capture output
    pub fn run_and_capture(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// A daily task three days overdue, a weekly Sunday task, a one-off with a
    /// due date, and a task with a broken rule.
    pub fn sample_tasks() -> &'static str {
        r#"[
            {
                "id": "0190c6a2-7a4e-7c11-9b3b-3f0e1f2d4a5b",
                "title": "Water plants",
                "recurrenceRule": "DTSTART:20250105;FREQ=DAILY",
                "scheduled": "2025-01-07",
                "completedInstances": ["2025-01-05", "2025-01-06"],
                "timeEntries": [
                    {"start": "2025-01-08T07:00:00Z", "end": "2025-01-08T07:20:00Z"}
                ]
            },
            {
                "id": "5b1e0c3a-1111-4c11-9b3b-3f0e1f2d4a5b",
                "title": "Weekly review",
                "recurrenceRule": "FREQ=WEEKLY;BYDAY=SU",
                "scheduled": "2025-01-05T18:00",
                "skippedInstances": ["2025-01-05"]
            },
            {
                "id": "7c2d9e4f-2222-4c11-9b3b-3f0e1f2d4a5b",
                "title": "File taxes",
                "due": "2025-01-15"
            },
            {
                "id": "9e3f1a5b-3333-4c11-9b3b-3f0e1f2d4a5b",
                "title": "Broken",
                "recurrenceRule": "FREQ=FORTNIGHTLY",
                "scheduled": "2025-01-12"
            }
        ]"#
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains calendar table headers
    pub fn has_calendar_headers() -> impl Predicate<str> {
        predicate::str::contains("Date")
            .and(predicate::str::contains("Kind"))
            .and(predicate::str::contains("Task"))
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
