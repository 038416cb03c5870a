use anyhow::{anyhow, Result};
use tasknote_core::error::CoreError;
use tasknote_core::models::TaskRecord;

/// Index of the task `reference` names: an exact title (case-insensitive)
/// or a prefix of the task's ID.
pub fn resolve_task(tasks: &[TaskRecord], reference: &str) -> Result<usize> {
    let reference = reference.trim();
    let by_title: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.title.eq_ignore_ascii_case(reference))
        .map(|(index, _)| index)
        .collect();
    if by_title.len() == 1 {
        return Ok(by_title[0]);
    }

    if by_title.is_empty() && reference.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }

    let prefix = reference.to_lowercase();
    let matches: Vec<usize> = if by_title.is_empty() {
        tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.id.to_string().starts_with(&prefix))
            .map(|(index, _)| index)
            .collect()
    } else {
        by_title
    };

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix or title '{}'",
            reference
        )))),
        _ => {
            let task_info: Vec<(String, String)> = matches
                .iter()
                .map(|&index| (tasks[index].id.to_string(), tasks[index].title.clone()))
                .collect();
            Err(anyhow!(CoreError::AmbiguousId(task_info)))
        }
    }
}
