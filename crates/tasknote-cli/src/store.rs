use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tasknote_core::models::TaskRecord;
use tracing::debug;

/// JSON file of task records, read whole and written whole.
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in the file. A missing file reads as no tasks.
    pub fn load(&self) -> Result<Vec<TaskRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "tasks file missing, starting empty");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read tasks file '{}'", self.path.display()))?;
        let tasks: Vec<TaskRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse tasks file '{}'", self.path.display()))?;
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Replaces the file's contents. Writes a sibling temp file first and
    /// renames it over the original, so readers never see half a file. The
    /// temp file is removed again if the rename fails.
    pub fn save(&self, tasks: &[TaskRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write '{}'", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to replace '{}'", self.path.display()));
        }
        debug!(count = tasks.len(), path = %self.path.display(), "saved tasks");
        Ok(())
    }
}
