use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::calendar::{end_of_day, start_of_day};

/// What a task record represents on the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Project,
    Milestone,
}

/// Per-task color overrides. Any field left `None` falls back to the
/// default for the task's type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskStyles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_selected_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_selected_color: Option<String>,
}

impl TaskStyles {
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.background_selected_color.is_none()
            && self.progress_color.is_none()
            && self.progress_selected_color.is_none()
    }
}

/// A single task, project or milestone as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(with = "flex_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "flex_datetime")]
    pub end: NaiveDateTime,
    /// Start before the current drag began. `None` means "same as `start`".
    #[serde(
        default,
        with = "flex_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_cache: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "flex_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_cache: Option<NaiveDateTime>,
    /// Progress percentage from 0 to 100.
    #[serde(default)]
    pub progress: f64,
    /// Length in work days. Zero means "derive from the dates".
    #[serde(default)]
    pub days_duration: u32,
    /// Ids of the tasks this one depends on. The first entry is the parent
    /// whose date shifts propagate to this task.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_children: Option<bool>,
    #[serde(default, skip_serializing_if = "TaskStyles::is_empty")]
    pub styles: TaskStyles,
    /// Owning project id, used when collapsing a project's children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
}

impl Task {
    /// Create a task spanning whole days from `start` through `end`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type: TaskType::Task,
            start: start_of_day(start),
            end: end_of_day(end),
            start_cache: None,
            end_cache: None,
            progress: 0.0,
            days_duration: 0,
            dependencies: Vec::new(),
            hide_children: None,
            styles: TaskStyles::default(),
            project: None,
            display_order: None,
        }
    }

    /// Create a project summary bar.
    pub fn new_project(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            task_type: TaskType::Project,
            hide_children: Some(false),
            ..Self::new(id, name, start, end)
        }
    }

    /// Create a milestone on a single date.
    pub fn new_milestone(id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        let mut task = Self::new(id, name, date, date);
        task.task_type = TaskType::Milestone;
        task.end = task.start;
        task
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_days_duration(mut self, days: u32) -> Self {
        self.days_duration = days;
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn cached_start(&self) -> NaiveDateTime {
        self.start_cache.unwrap_or(self.start)
    }

    pub fn cached_end(&self) -> NaiveDateTime {
        self.end_cache.unwrap_or(self.end)
    }

    /// The parent whose shifts this task follows.
    pub fn parent_id(&self) -> Option<&str> {
        self.dependencies.first().map(String::as_str)
    }

    pub fn is_milestone(&self) -> bool {
        self.task_type == TaskType::Milestone
    }
}

/// Serde helper for instants that accepts either a full date-time
/// (`2024-03-04T00:00:00`) or a bare date (`2024-03-04`, read as midnight).
pub(crate) mod flex_datetime {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        for fmt in [FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
    }

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(dt: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match dt {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_spans_whole_days() {
        let task = Task::new("1", "Design", date(2024, 3, 4), date(2024, 3, 8));
        assert_eq!(task.start.to_string(), "2024-03-04 00:00:00");
        assert_eq!(task.end.to_string(), "2024-03-08 23:59:59");
        assert_eq!(task.cached_end(), task.end);
    }

    #[test]
    fn milestone_end_equals_start() {
        let m = Task::new_milestone("m", "Launch", date(2024, 3, 4));
        assert_eq!(m.start, m.end);
        assert!(m.is_milestone());
    }

    #[test]
    fn deserializes_bare_dates_and_defaults() {
        let json = r#"{"id":"a","type":"project","start":"2024-03-04","end":"2024-03-06T23:59:59"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.task_type, TaskType::Project);
        assert_eq!(task.start, date(2024, 3, 4).and_hms_opt(0, 0, 0).unwrap());
        assert!(task.start_cache.is_none());
        assert!(task.dependencies.is_empty());
        assert!(task.styles.is_empty());
    }
}
