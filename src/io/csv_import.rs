use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{GanttError, Result};
use crate::model::{Task, TaskStyles, TaskType};

/// Map a status word or a number to a progress percentage (0 – 100).
fn parse_progress(value: &str) -> f64 {
    let value = value.trim().trim_end_matches('%');
    if let Ok(number) = value.parse::<f64>() {
        return number.clamp(0.0, 100.0);
    }
    match value.to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => 100.0,
        "in progress" | "in-progress" | "active" | "started" => 50.0,
        "released" | "planned" => 25.0,
        _ => 0.0,
    }
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "y" => Some(true),
        "false" | "no" | "0" | "n" => Some(false),
        _ => None,
    }
}

fn parse_type(value: &str) -> Option<TaskType> {
    match value.trim().to_lowercase().as_str() {
        "task" => Some(TaskType::Task),
        "project" | "phase" | "group" => Some(TaskType::Project),
        "milestone" | "true" | "yes" | "1" => Some(TaskType::Milestone),
        _ => None,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Name,
    Start,
    End,
    Progress,
    Id,
    Type,
    Parent,
    Dependencies,
    Project,
    Duration,
    Order,
    Collapsed,
    Background,
    BackgroundSelected,
    ProgressColor,
    ProgressSelected,
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),

        "status" | "state" | "progress" | "stage" | "complete" => Some(Column::Progress),

        "id" | "taskid" | "key" => Some(Column::Id),

        "type" | "kind" | "milestone" | "ismilestone" => Some(Column::Type),

        "parent" | "parenttask" | "parentname" | "subtaskof" => Some(Column::Parent),

        "dependencies" | "dependson" | "predecessors" => Some(Column::Dependencies),

        "project" | "projectid" => Some(Column::Project),

        "duration" | "days" | "workdays" | "daysduration" => Some(Column::Duration),

        "order" | "displayorder" | "row" => Some(Column::Order),

        "collapsed" | "hidechildren" => Some(Column::Collapsed),

        "background" | "backgroundcolor" | "color" => Some(Column::Background),
        "backgroundselected" | "backgroundselectedcolor" => Some(Column::BackgroundSelected),
        "progresscolor" => Some(Column::ProgressColor),
        "progressselected" | "progressselectedcolor" => Some(Column::ProgressSelected),

        _ => None,
    }
}

/// Import tasks from a CSV file.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches headers
/// loosely ("Task Label", "Start Date", …). Rows without an id get a fresh
/// one. A `Parent` column names the parent task; it is resolved to that
/// task's id and becomes the first dependency.
/// Returns `(tasks, skipped_count)`.
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize)> {
    let content = std::fs::read_to_string(path).map_err(|e| GanttError::io(path, e))?;
    import_csv_str(&content)
}

pub fn import_csv_str(content: &str) -> Result<(Vec<Task>, usize)> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |wanted: Column| columns.iter().any(|c| *c == Some(wanted));
    if !has(Column::Name) || !has(Column::Start) || !has(Column::End) {
        return Err(GanttError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    // Parent names are resolved once every row is known.
    let mut tasks: Vec<Task> = Vec::new();
    let mut parent_names: Vec<Option<String>> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut fields: HashMap<Column, String> = HashMap::new();
        for (value, column) in record.iter().zip(&columns) {
            if let Some(column) = column {
                fields.insert(*column, value.trim().to_string());
            }
        }
        let field = |c: Column| fields.get(&c).map(String::as_str).filter(|s| !s.is_empty());

        let Some(name) = field(Column::Name) else {
            skipped += 1;
            continue;
        };

        let Some(start) = field(Column::Start).and_then(parse_date) else {
            tracing::warn!(row, value = field(Column::Start).unwrap_or(""), "skipping row with invalid start date");
            skipped += 1;
            continue;
        };

        let Some(end) = field(Column::End).and_then(parse_date) else {
            tracing::warn!(row, value = field(Column::End).unwrap_or(""), "skipping row with invalid end date");
            skipped += 1;
            continue;
        };

        // Explicit type wins; otherwise a zero-length row is a milestone.
        let task_type = field(Column::Type)
            .and_then(parse_type)
            .unwrap_or(if start == end { TaskType::Milestone } else { TaskType::Task });

        let id = field(Column::Id)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut task = Task::new(id, name, start, end.max(start));
        task.task_type = task_type;
        if task_type == TaskType::Milestone {
            task.end = task.start;
        }
        if task_type == TaskType::Project {
            task.hide_children = Some(false);
        }
        task.progress = field(Column::Progress).map(parse_progress).unwrap_or(0.0);
        task.days_duration = field(Column::Duration)
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        task.project = field(Column::Project).map(str::to_string);
        task.display_order = field(Column::Order).and_then(|o| o.parse().ok());
        if let Some(collapsed) = field(Column::Collapsed).and_then(parse_flag) {
            task.hide_children = Some(collapsed);
        }
        task.styles = TaskStyles {
            background_color: field(Column::Background).map(str::to_string),
            background_selected_color: field(Column::BackgroundSelected).map(str::to_string),
            progress_color: field(Column::ProgressColor).map(str::to_string),
            progress_selected_color: field(Column::ProgressSelected).map(str::to_string),
        };
        task.dependencies = field(Column::Dependencies)
            .map(|deps| {
                deps.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        parent_names.push(field(Column::Parent).map(str::to_string));
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(GanttError::NoTasks { skipped });
    }

    let name_to_id: HashMap<String, String> = tasks
        .iter()
        .map(|t| (t.name.to_lowercase(), t.id.clone()))
        .collect();

    for (task, parent_name) in tasks.iter_mut().zip(parent_names.iter()) {
        let Some(parent_name) = parent_name else {
            continue;
        };
        match name_to_id.get(&parent_name.to_lowercase()) {
            Some(parent_id) if *parent_id != task.id => {
                task.dependencies.retain(|d| d != parent_id);
                task.dependencies.insert(0, parent_id.clone());
            }
            Some(_) => {}
            None => tracing::warn!(parent = %parent_name, task = %task.name, "parent task not found"),
        }
    }

    tracing::debug!(tasks = tasks.len(), skipped, "imported CSV");
    Ok((tasks, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_word_progress() {
        assert_eq!(parse_progress("42"), 42.0);
        assert_eq!(parse_progress("75%"), 75.0);
        assert_eq!(parse_progress("Done"), 100.0);
        assert_eq!(parse_progress("whatever"), 0.0);
    }

    #[test]
    fn flags_and_style_headers() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(header_to_column("progresscolor"), Some(Column::ProgressColor));
        assert_eq!(header_to_column("progress"), Some(Column::Progress));
    }

    #[test]
    fn detects_delimiters() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
    }
}
