use std::path::Path;

use crate::error::{GanttError, Result};
use crate::model::{Task, TaskType};

fn type_label(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Task => "task",
        TaskType::Project => "project",
        TaskType::Milestone => "milestone",
    }
}

/// Export tasks to a semicolon-delimited CSV file that `import_csv` reads
/// back.
///
/// Columns: ID ; Task Label ; Type ; Start Date ; End Date ; Progress ;
/// Duration ; Dependencies ; Project ; Order ; Collapsed, then the four
/// style colors. Dates are formatted as DD/MM/YYYY and empty cells stand
/// for unset values.
/// Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path).map_err(|e| GanttError::io(path, e))?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(file);

    wtr.write_record([
        "ID",
        "Task Label",
        "Type",
        "Start Date",
        "End Date",
        "Progress",
        "Duration",
        "Dependencies",
        "Project",
        "Order",
        "Collapsed",
        "Background",
        "Background Selected",
        "Progress Color",
        "Progress Selected",
    ])?;

    for task in tasks {
        let styles = &task.styles;
        wtr.write_record([
            task.id.as_str(),
            task.name.as_str(),
            type_label(task.task_type),
            &task.start.format("%d/%m/%Y").to_string(),
            &task.end.format("%d/%m/%Y").to_string(),
            &task.progress.round().to_string(),
            &task.days_duration.to_string(),
            &task.dependencies.join(","),
            task.project.as_deref().unwrap_or(""),
            &task.display_order.map(|o| o.to_string()).unwrap_or_default(),
            task.hide_children.map_or("", |h| if h { "true" } else { "false" }),
            styles.background_color.as_deref().unwrap_or(""),
            styles.background_selected_color.as_deref().unwrap_or(""),
            styles.progress_color.as_deref().unwrap_or(""),
            styles.progress_selected_color.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush().map_err(|e| GanttError::io(path, e))?;
    tracing::debug!(tasks = tasks.len(), path = %path.display(), "exported CSV");
    Ok(tasks.len())
}
