//! Default bar palettes and per-task style resolution.

use serde::{Deserialize, Serialize};

use crate::model::{BarColors, TaskStyles, TaskType};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const BAR_PROGRESS: &str = "#a3a3ff";
pub const BAR_PROGRESS_SELECTED: &str = "#8282f5";
pub const BAR_BACKGROUND: &str = "#b8c2cc";
pub const BAR_BACKGROUND_SELECTED: &str = "#aeb8c2";

pub const PROJECT_PROGRESS: &str = "#7db59a";
pub const PROJECT_PROGRESS_SELECTED: &str = "#59a985";
pub const PROJECT_BACKGROUND: &str = "#fac465";
pub const PROJECT_BACKGROUND_SELECTED: &str = "#f7bb53";

pub const MILESTONE_BACKGROUND: &str = "#f1c453";
pub const MILESTONE_BACKGROUND_SELECTED: &str = "#f29e4c";

/// Palette per task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub task: BarColors,
    pub project: BarColors,
    pub milestone: BarColors,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            task: BarColors {
                background: BAR_BACKGROUND.into(),
                background_selected: BAR_BACKGROUND_SELECTED.into(),
                progress: BAR_PROGRESS.into(),
                progress_selected: BAR_PROGRESS_SELECTED.into(),
            },
            project: BarColors {
                background: PROJECT_BACKGROUND.into(),
                background_selected: PROJECT_BACKGROUND_SELECTED.into(),
                progress: PROJECT_PROGRESS.into(),
                progress_selected: PROJECT_PROGRESS_SELECTED.into(),
            },
            // Milestones never show progress; the fill matches the diamond.
            milestone: BarColors {
                background: MILESTONE_BACKGROUND.into(),
                background_selected: MILESTONE_BACKGROUND_SELECTED.into(),
                progress: MILESTONE_BACKGROUND.into(),
                progress_selected: MILESTONE_BACKGROUND_SELECTED.into(),
            },
        }
    }
}

impl ColorConfig {
    pub fn defaults_for(&self, task_type: TaskType) -> &BarColors {
        match task_type {
            TaskType::Task => &self.task,
            TaskType::Project => &self.project,
            TaskType::Milestone => &self.milestone,
        }
    }

    /// Type defaults with any per-task override applied field by field.
    pub fn resolve(&self, task_type: TaskType, styles: &TaskStyles) -> BarColors {
        let base = self.defaults_for(task_type);
        let pick = |custom: &Option<String>, fallback: &String| {
            custom.clone().unwrap_or_else(|| fallback.clone())
        };
        BarColors {
            background: pick(&styles.background_color, &base.background),
            background_selected: pick(&styles.background_selected_color, &base.background_selected),
            progress: pick(&styles.progress_color, &base.progress),
            progress_selected: pick(&styles.progress_selected_color, &base.progress_selected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_the_fields_given() {
        let colors = ColorConfig::default();
        let styles = TaskStyles {
            progress_color: Some("#000000".into()),
            ..Default::default()
        };
        let resolved = colors.resolve(TaskType::Project, &styles);
        assert_eq!(resolved.progress, "#000000");
        assert_eq!(resolved.background, PROJECT_BACKGROUND);
        assert_eq!(resolved.progress_selected, PROJECT_PROGRESS_SELECTED);
    }
}
