use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the geometry core: axis construction, configuration
/// and file IO. Layout and drag arithmetic never fail.
#[derive(Error, Debug)]
pub enum GanttError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date axis: {0}")]
    InvalidAxis(String),

    #[error("CSV is missing required columns (found {found:?}); need task name, start date, end date")]
    MissingColumns { found: Vec<String> },

    #[error("no valid tasks found ({skipped} rows skipped)")]
    NoTasks { skipped: usize },

    #[error("unknown task id: {0}")]
    UnknownTask(String),
}

impl GanttError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GanttError>;
