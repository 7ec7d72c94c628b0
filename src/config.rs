//! Chart settings, persisted as JSON in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{ArrowStyle, ColorConfig, LayoutConfig};
use crate::error::{GanttError, Result};
use crate::model::{Direction, TimelineScale, WorkCalendar};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub column_width: f64,
    pub row_height: f64,
    /// Share of the row height a bar fills, in percent.
    pub bar_fill: f64,
    pub handle_width: f64,
    pub bar_corner_radius: f64,
    /// Time covered by one drag step.
    pub time_step_ms: i64,
    /// Sunday-based weekday numbers that are not worked.
    pub exclude_weekdays: WorkCalendar,
    pub direction: Direction,
    pub scale: TimelineScale,
    /// Extra axis columns before the earliest task.
    pub pre_steps: u32,
    pub colors: ColorConfig,
    pub arrow: ArrowStyle,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            column_width: 60.0,
            row_height: 50.0,
            bar_fill: 60.0,
            handle_width: 8.0,
            bar_corner_radius: 3.0,
            time_step_ms: 24 * 60 * 60 * 1000,
            exclude_weekdays: WorkCalendar::default(),
            direction: Direction::Ltr,
            scale: TimelineScale::Day,
            pre_steps: 1,
            colors: ColorConfig::default(),
            arrow: ArrowStyle::default(),
        }
    }
}

impl ChartConfig {
    pub fn task_height(&self) -> f64 {
        self.row_height * self.bar_fill / 100.0
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            column_width: self.column_width,
            row_height: self.row_height,
            task_height: self.task_height(),
            handle_width: self.handle_width,
            corner_radius: self.bar_corner_radius,
            calendar: self.exclude_weekdays,
            colors: self.colors.clone(),
            direction: self.direction,
        }
    }

    /// `config.json` under the user's config directory.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "GanttLayout") {
            Some(dirs) => dirs.config_dir().join(CONFIG_FILE),
            None => PathBuf::from(".").join(CONFIG_FILE),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| GanttError::io(path, e))?;
        let config = serde_json::from_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded chart config");
        Ok(config)
    }

    /// Load an explicitly named file, or the default location if it exists.
    /// A missing default file yields the built-in settings.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no chart config, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| GanttError::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| GanttError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_height_follows_bar_fill() {
        let config = ChartConfig::default();
        assert_eq!(config.task_height(), 30.0);
        assert_eq!(config.layout_config().task_height, 30.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ChartConfig =
            serde_json::from_str(r#"{"exclude_weekdays":[0,6],"direction":"rtl"}"#).unwrap();
        assert_eq!(config.exclude_weekdays, WorkCalendar::weekends());
        assert_eq!(config.direction, Direction::Rtl);
        assert_eq!(config.column_width, 60.0);
    }
}
