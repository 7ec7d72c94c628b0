//! Task list → positioned bars, including the work-day shift pass.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::colors::ColorConfig;
use crate::model::calendar::{days_diff, end_of_day, start_of_day};
use crate::model::task::flex_datetime;
use crate::model::{BarKind, DateAxis, Direction, PositionedBar, Task, TaskType, WorkCalendar};

/// Geometry and calendar settings for one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub column_width: f64,
    pub row_height: f64,
    /// Height of a bar inside its row.
    pub task_height: f64,
    pub handle_width: f64,
    pub corner_radius: f64,
    pub calendar: WorkCalendar,
    pub colors: ColorConfig,
    pub direction: Direction,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 60.0,
            row_height: 50.0,
            task_height: 30.0,
            handle_width: 8.0,
            corner_radius: 3.0,
            calendar: WorkCalendar::default(),
            colors: ColorConfig::default(),
            direction: Direction::Ltr,
        }
    }
}

/// Corrected dates for one task, produced by a layout pass. Applying a patch
/// also refreshes the task's cached dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePatch {
    pub task_id: String,
    #[serde(with = "flex_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "flex_datetime")]
    pub end: NaiveDateTime,
    pub days_duration: u32,
}

impl DatePatch {
    pub fn apply(&self, task: &mut Task) {
        task.start = self.start;
        task.end = self.end;
        task.start_cache = Some(self.start);
        task.end_cache = Some(self.end);
        task.days_duration = self.days_duration;
    }
}

/// Apply every patch whose id matches a task. Returns how many tasks changed.
pub fn apply_patches(tasks: &mut [Task], patches: &[DatePatch]) -> usize {
    let mut applied = 0;
    for patch in patches {
        if let Some(task) = tasks.iter_mut().find(|t| t.id == patch.task_id) {
            let before = (task.start, task.end);
            patch.apply(task);
            if before != (task.start, task.end) {
                applied += 1;
            }
        }
    }
    applied
}

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub bars: Vec<PositionedBar>,
    pub patches: Vec<DatePatch>,
}

impl Layout {
    pub fn bar(&self, id: &str) -> Option<&PositionedBar> {
        self.bars.iter().find(|b| b.task.id == id)
    }
}

/// Lay out `tasks` in the given row order.
///
/// Converts every task to a bar, links dependents to their parents, then
/// runs the work-day shift pass. The caller's tasks are left untouched; the
/// corrected dates come back as patches.
pub fn layout(tasks: &[Task], axis: &DateAxis, config: &LayoutConfig) -> Layout {
    let mut bars: Vec<PositionedBar> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| convert_task(task, index, axis, config))
        .collect();

    link_children(&mut bars);
    shift_work_days(&mut bars, axis, config);

    // Caches hold the pre-pass dates until every bar has been shifted.
    let patches = bars
        .iter_mut()
        .map(|bar| {
            bar.task.start_cache = Some(bar.task.start);
            bar.task.end_cache = Some(bar.task.end);
            DatePatch {
                task_id: bar.task.id.clone(),
                start: bar.task.start,
                end: bar.task.end,
                days_duration: bar.task.days_duration,
            }
        })
        .collect();

    tracing::debug!(bars = bars.len(), "layout pass complete");
    Layout { bars, patches }
}

/// Position a single task on row `index`.
pub fn convert_task(task: &Task, index: usize, axis: &DateAxis, config: &LayoutConfig) -> PositionedBar {
    match task.task_type {
        TaskType::Milestone => convert_milestone(task, index, axis, config),
        TaskType::Task | TaskType::Project => convert_bar(task, index, axis, config),
    }
}

fn convert_bar(task: &Task, index: usize, axis: &DateAxis, config: &LayoutConfig) -> PositionedBar {
    let mut task = task.clone();
    task.start = start_of_day(task.start.date());
    task.end = end_of_day(task.end.date());
    if task.task_type != TaskType::Project {
        task.hide_children = None;
    }

    let (x1, x2) = bar_extent(task.start, task.end, axis, config);
    let kind = match task.task_type {
        TaskType::Project => BarKind::Project,
        _ => BarKind::Task,
    };
    let colors = config.colors.resolve(task.task_type, &task.styles);

    let mut bar = PositionedBar {
        task,
        kind,
        index,
        x1,
        x2,
        y: task_y(index, config.row_height, config.task_height),
        height: config.task_height,
        progress_x: 0.0,
        progress_width: 0.0,
        handle_width: config.handle_width,
        corner_radius: config.corner_radius,
        colors,
        children: Vec::new(),
    };
    bar.enforce_min_width(config.direction);
    bar.refresh_progress(config.direction);
    bar
}

fn convert_milestone(task: &Task, index: usize, axis: &DateAxis, config: &LayoutConfig) -> PositionedBar {
    let mut task = task.clone();
    task.end = task.start;
    task.progress = 0.0;
    task.hide_children = None;

    let x = date_x(task.start, axis, config);
    let half = config.task_height * 0.5;
    let colors = config.colors.resolve(TaskType::Milestone, &task.styles);

    PositionedBar {
        task,
        kind: BarKind::Milestone,
        index,
        x1: x - half,
        x2: x + half,
        y: task_y(index, config.row_height, config.task_height),
        // The diamond is a square of side `task_height` rotated 45°.
        height: config.task_height / std::f64::consts::SQRT_2,
        progress_x: 0.0,
        progress_width: 0.0,
        handle_width: config.handle_width,
        corner_radius: config.corner_radius,
        colors,
        children: Vec::new(),
    }
}

/// Top of the bar inside row `index`, vertically centred.
pub fn task_y(index: usize, row_height: f64, task_height: f64) -> f64 {
    index as f64 * row_height + (row_height - task_height) / 2.0
}

fn date_x(date: NaiveDateTime, axis: &DateAxis, config: &LayoutConfig) -> f64 {
    let x = axis.date_to_x(date, config.column_width);
    match config.direction {
        Direction::Ltr => x,
        Direction::Rtl => axis.total_width(config.column_width) - x,
    }
}

/// Pixel extent `(x1, x2)` of a bar running from `start` to `end`.
pub fn bar_extent(
    start: NaiveDateTime,
    end: NaiveDateTime,
    axis: &DateAxis,
    config: &LayoutConfig,
) -> (f64, f64) {
    let from = date_x(start, axis, config);
    let to = date_x(end, axis, config);
    match config.direction {
        Direction::Ltr => (from, to),
        Direction::Rtl => (to, from),
    }
}

fn link_children(bars: &mut [PositionedBar]) {
    let rows = row_lookup(bars);
    for child in 0..bars.len() {
        for dep in bars[child].task.dependencies.clone() {
            match rows.get(dep.as_str()) {
                Some(&parent) if parent != child => {
                    if !bars[parent].children.contains(&child) {
                        bars[parent].children.push(child);
                    }
                }
                Some(_) => tracing::trace!(task = %dep, "ignoring self dependency"),
                None => tracing::trace!(
                    task = %bars[child].task.id,
                    dependency = %dep,
                    "ignoring unknown dependency"
                ),
            }
        }
    }
}

/// First row for every task id.
fn row_lookup(bars: &[PositionedBar]) -> HashMap<String, usize> {
    let mut rows = HashMap::with_capacity(bars.len());
    for (row, bar) in bars.iter().enumerate() {
        rows.entry(bar.task.id.clone()).or_insert(row);
    }
    rows
}

/// Direction of the shift a dependent takes when its parent's end moved by
/// `days_shift` days: one day toward the move, or none.
pub fn parent_shift_step(days_shift: i64) -> i64 {
    days_shift.signum()
}

/// Rows ordered so that every bar comes after the parent named by its first
/// dependency. Unknown parents and cycles count as roots; ties keep row
/// order.
pub fn shift_order(bars: &[PositionedBar]) -> Vec<usize> {
    let rows = row_lookup(bars);
    let parent_of = |row: usize| {
        bars[row]
            .task
            .parent_id()
            .and_then(|id| rows.get(id).copied())
            .filter(|parent| *parent != row)
    };

    let mut depth: Vec<Option<usize>> = vec![None; bars.len()];
    for row in 0..bars.len() {
        let mut chain = Vec::new();
        let mut cursor = Some(row);
        let mut base = 0;
        while let Some(current) = cursor {
            if let Some(known) = depth[current] {
                base = known + 1;
                break;
            }
            if chain.contains(&current) {
                break;
            }
            chain.push(current);
            cursor = parent_of(current);
        }
        for node in chain.into_iter().rev() {
            depth[node] = Some(base);
            base += 1;
        }
    }

    let mut order: Vec<usize> = (0..bars.len()).collect();
    order.sort_by_key(|row| depth[*row].unwrap_or(0));
    order
}

/// Snap every bar onto the work calendar and carry parent date shifts over
/// to their dependents, parents first. Safe to re-run on bars after a drag
/// has been merged back.
pub fn shift_work_days(bars: &mut [PositionedBar], axis: &DateAxis, config: &LayoutConfig) {
    let rows = row_lookup(bars);
    let mut shifted = 0usize;

    for row in shift_order(bars) {
        if bars[row].kind == BarKind::Milestone {
            continue;
        }
        let parent_shift = bars[row]
            .task
            .parent_id()
            .and_then(|id| rows.get(id).copied())
            .filter(|parent| *parent != row)
            .map(|parent| days_diff(bars[parent].task.cached_end(), bars[parent].task.end));

        let bar = &mut bars[row];
        let before = (bar.task.start, bar.task.end);
        shift_bar(bar, parent_shift, axis, config);
        if before != (bar.task.start, bar.task.end) {
            shifted += 1;
        }
    }

    tracing::debug!(shifted, "work-day shift pass");
}

fn shift_bar(
    bar: &mut PositionedBar,
    parent_shift: Option<i64>,
    axis: &DateAxis,
    config: &LayoutConfig,
) {
    let task = &mut bar.task;

    if task.end != task.cached_end() {
        let step = parent_shift.map(parent_shift_step).unwrap_or(0);
        if step != 0 {
            let days = chrono::Duration::days(step);
            let (cached_start, cached_end) = (task.cached_start(), task.cached_end());
            task.start = cached_start.checked_add_signed(days).unwrap_or(cached_start);
            task.end = cached_end.checked_add_signed(days).unwrap_or(cached_end);
        }
    }

    if task.days_duration == 0 {
        task.days_duration = config.calendar.duration_of(task.start, task.end);
    }

    let (start, end) =
        config
            .calendar
            .correct(task.start, task.end, task.cached_start(), task.days_duration);
    task.start = start;
    task.end = end;

    let (x1, x2) = bar_extent(start, end, axis, config);
    bar.x1 = x1;
    bar.x2 = x2;
    bar.enforce_min_width(config.direction);
    bar.refresh_progress(config.direction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimelineScale;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn axis() -> DateAxis {
        DateAxis::seed(day(1), day(31), TimelineScale::Day).unwrap()
    }

    #[test]
    fn children_point_at_dependents() {
        let tasks = vec![
            Task::new("a", "A", day(4), day(5)),
            Task::new("b", "B", day(6), day(7)).with_dependency("a"),
            Task::new("c", "C", day(6), day(7)).with_dependency("missing"),
        ];
        let out = layout(&tasks, &axis(), &LayoutConfig::default());
        assert_eq!(out.bars[0].children, vec![1]);
        assert!(out.bars[1].children.is_empty());
        assert!(out.bars[2].children.is_empty());
    }

    #[test]
    fn shift_order_puts_parents_first() {
        let tasks = vec![
            Task::new("child", "C", day(6), day(7)).with_dependency("mid"),
            Task::new("mid", "M", day(5), day(6)).with_dependency("root"),
            Task::new("root", "R", day(4), day(5)),
        ];
        let cfg = LayoutConfig::default();
        let bars: Vec<_> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| convert_task(t, i, &axis(), &cfg))
            .collect();
        assert_eq!(shift_order(&bars), vec![2, 1, 0]);
    }

    #[test]
    fn dependency_cycles_do_not_hang() {
        let tasks = vec![
            Task::new("a", "A", day(4), day(5)).with_dependency("b"),
            Task::new("b", "B", day(6), day(7)).with_dependency("a"),
        ];
        let out = layout(&tasks, &axis(), &LayoutConfig::default());
        assert_eq!(out.bars.len(), 2);
    }

    #[test]
    fn patches_carry_corrected_dates() {
        let cfg = LayoutConfig {
            calendar: WorkCalendar::weekends(),
            ..Default::default()
        };
        // Saturday start snaps forward to Monday.
        let tasks = vec![Task::new("a", "A", day(9), day(9)).with_days_duration(2)];
        let out = layout(&tasks, &axis(), &cfg);
        let patch = &out.patches[0];
        assert_eq!(patch.start, start_of_day(day(11)));
        assert_eq!(patch.end, end_of_day(day(12)));

        let mut store = tasks.clone();
        assert_eq!(apply_patches(&mut store, &out.patches), 1);
        assert_eq!(store[0].start_cache, Some(patch.start));
    }
}
