use std::path::Path;

use super::csv_import::import_csv;
use crate::error::{GanttError, Result};
use crate::model::Task;

/// Save a task list to a JSON file.
pub fn save_tasks(tasks: &[Task], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(tasks)?;
    std::fs::write(path, json).map_err(|e| GanttError::io(path, e))
}

/// Load a task list from a JSON file.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let json = std::fs::read_to_string(path).map_err(|e| GanttError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

/// Load tasks from JSON, or from CSV when the extension says so.
pub fn load_any(path: &Path) -> Result<Vec<Task>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        let (tasks, skipped) = import_csv(path)?;
        if skipped > 0 {
            tracing::warn!(skipped, path = %path.display(), "some CSV rows were skipped");
        }
        Ok(tasks)
    } else {
        load_tasks(path)
    }
}
