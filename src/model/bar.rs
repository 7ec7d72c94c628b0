use serde::{Deserialize, Serialize};

use super::task::Task;

/// Horizontal layout direction. Right-to-left charts mirror every x
/// coordinate: later dates sit further left and progress fills from x2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }
}

/// Visual classification of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarKind {
    Task,
    /// A task narrower than its two resize handles.
    SmallTask,
    Project,
    Milestone,
}

impl BarKind {
    /// Task-like bars are subject to the two-handle minimum width.
    pub fn is_task(self) -> bool {
        matches!(self, BarKind::Task | BarKind::SmallTask)
    }
}

/// Resolved paint colors for one bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarColors {
    pub background: String,
    pub background_selected: String,
    pub progress: String,
    pub progress_selected: String,
}

/// A task placed on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBar {
    #[serde(flatten)]
    pub task: Task,
    pub kind: BarKind,
    /// Row on the chart.
    pub index: usize,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub height: f64,
    pub progress_x: f64,
    pub progress_width: f64,
    pub handle_width: f64,
    pub corner_radius: f64,
    pub colors: BarColors,
    /// Rows of the bars that list this one as a dependency.
    pub children: Vec<usize>,
}

impl PositionedBar {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Narrowest a task bar may be: room for both resize handles.
    pub fn min_width(&self) -> f64 {
        self.handle_width * 2.0
    }

    /// Collapse inverted extents, then widen task bars that are narrower
    /// than both handles while keeping the start edge in place. Updates the
    /// task/smalltask split.
    pub fn enforce_min_width(&mut self, direction: Direction) {
        if self.x2 < self.x1 {
            match direction {
                Direction::Ltr => self.x2 = self.x1,
                Direction::Rtl => self.x1 = self.x2,
            }
        }
        if !self.kind.is_task() {
            return;
        }
        if self.width() < self.min_width() {
            self.kind = BarKind::SmallTask;
            match direction {
                Direction::Ltr => self.x2 = self.x1 + self.min_width(),
                Direction::Rtl => self.x1 = self.x2 - self.min_width(),
            }
        } else {
            self.kind = BarKind::Task;
        }
    }

    /// Recompute the progress indicator from the current extent.
    pub fn refresh_progress(&mut self, direction: Direction) {
        let (width, x) = progress_geometry(self.x1, self.x2, self.task.progress, direction);
        self.progress_width = width;
        self.progress_x = x;
    }

    /// Decode the rendered progress width back into a whole percentage.
    pub fn progress_from_width(&self) -> f64 {
        let width = self.width();
        if width <= 0.0 {
            return 0.0;
        }
        ((self.progress_width * 100.0) / width).round().clamp(0.0, 100.0)
    }

    /// Triangle of the progress grip drawn under the bar at the edge of the
    /// progress fill.
    pub fn progress_handle(&self, direction: Direction) -> [(f64, f64); 3] {
        let edge = match direction {
            Direction::Ltr => self.progress_x + self.progress_width,
            Direction::Rtl => self.progress_x,
        };
        let base = self.y + self.height;
        [(edge - 5.0, base), (edge + 5.0, base), (edge, base - 8.66)]
    }
}

/// Width and left edge of the progress fill for a bar spanning `x1..x2`.
pub fn progress_geometry(x1: f64, x2: f64, progress: f64, direction: Direction) -> (f64, f64) {
    let width = (x2 - x1) * progress.clamp(0.0, 100.0) * 0.01;
    let x = match direction {
        Direction::Ltr => x1,
        Direction::Rtl => x2 - width,
    };
    (width, x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_anchors_follow_direction() {
        assert_eq!(progress_geometry(100.0, 200.0, 25.0, Direction::Ltr), (25.0, 100.0));
        assert_eq!(progress_geometry(100.0, 200.0, 25.0, Direction::Rtl), (25.0, 175.0));
    }

    #[test]
    fn progress_width_stays_inside_the_bar() {
        let (width, _) = progress_geometry(0.0, 80.0, 140.0, Direction::Ltr);
        assert_eq!(width, 80.0);
        let (width, _) = progress_geometry(0.0, 80.0, -5.0, Direction::Ltr);
        assert_eq!(width, 0.0);
    }
}
