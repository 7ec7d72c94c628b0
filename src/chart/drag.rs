//! Pointer drags on a single bar: move, resize either edge, or adjust
//! progress.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::layout::LayoutConfig;
use crate::model::calendar::{end_of_day, start_of_day};
use crate::model::{DateAxis, Direction, PositionedBar, TaskType, WorkCalendar};

/// Larger than any span between representable dates, and small enough to
/// fit a `Duration`.
const MAX_OFFSET_MS: f64 = 1.0e17;

/// Which part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragAction {
    Move,
    /// The handle on the start date's edge.
    Start,
    /// The handle on the end date's edge.
    End,
    Progress,
}

impl fmt::Display for DragAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DragAction::Move => "move",
            DragAction::Start => "start",
            DragAction::End => "end",
            DragAction::Progress => "progress",
        };
        f.write_str(name)
    }
}

impl FromStr for DragAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "move" => Ok(DragAction::Move),
            "start" => Ok(DragAction::Start),
            "end" => Ok(DragAction::End),
            "progress" => Ok(DragAction::Progress),
            other => Err(format!(
                "unknown drag action '{}' (expected move, start, end or progress)",
                other
            )),
        }
    }
}

/// Scale and calendar a drag is interpreted against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    /// Pixels covered by one time step; pointer motion snaps to this grid.
    pub pixels_per_step: f64,
    pub ms_per_step: i64,
    pub calendar: WorkCalendar,
    pub direction: Direction,
}

impl DragContext {
    pub fn new(axis: &DateAxis, config: &LayoutConfig, ms_per_step: i64) -> Self {
        Self {
            pixels_per_step: axis.pixels_per_step(config.column_width, ms_per_step),
            ms_per_step,
            calendar: config.calendar,
            direction: config.direction,
        }
    }
}

/// Candidate bar produced by a drag. `changed` is false when the drag would
/// have no visible effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragOutcome {
    pub changed: bool,
    pub bar: PositionedBar,
}

/// Interpret a pointer at `pointer_x` dragging `bar` with `action`.
///
/// `grab_offset` is the pointer's distance from `bar.x1` when the drag
/// began; it only matters for `Move`. The input bar is never modified.
pub fn interpret(
    pointer_x: f64,
    action: DragAction,
    bar: &PositionedBar,
    ctx: &DragContext,
    grab_offset: f64,
) -> DragOutcome {
    // Right-to-left bars are negated into left-to-right space, where the
    // start edge is always x1, and negated back afterwards.
    let rtl = ctx.direction.is_rtl();
    let target_x1 = pointer_x - grab_offset;
    let (view, pointer, target_x1) = if rtl {
        (mirror(bar), -pointer_x, -(target_x1 + bar.width()))
    } else {
        (bar.clone(), pointer_x, target_x1)
    };

    let (changed, mut next) = match bar.task.task_type {
        TaskType::Milestone => drag_milestone(target_x1, action, &view, ctx),
        TaskType::Task | TaskType::Project => drag_bar(pointer, target_x1, action, &view, ctx),
    };

    if rtl {
        next = mirror(&next);
    }
    if next.task.task_type != TaskType::Milestone {
        next.refresh_progress(ctx.direction);
    }
    DragOutcome { changed, bar: next }
}

fn mirror(bar: &PositionedBar) -> PositionedBar {
    let mut mirrored = bar.clone();
    mirrored.x1 = -bar.x2;
    mirrored.x2 = -bar.x1;
    mirrored
}

fn drag_bar(
    pointer: f64,
    target_x1: f64,
    action: DragAction,
    bar: &PositionedBar,
    ctx: &DragContext,
) -> (bool, PositionedBar) {
    let mut next = bar.clone();
    let calendar = &ctx.calendar;

    let changed = match action {
        DragAction::Progress => {
            next.task.progress = progress_by_x(pointer, bar);
            next.task.progress != bar.task.progress
        }
        DragAction::Start => {
            let x1 = start_by_x(pointer, ctx.pixels_per_step, bar);
            next.x1 = x1;
            next.task.start = date_by_x(x1, bar.x1, bar.task.start, ctx);

            let task = &mut next.task;
            let landed_back_on_excluded =
                task.start < task.cached_start() && calendar.is_excluded(task.start.date());
            task.days_duration = calendar
                .work_days_between(task.start, task.end)
                .saturating_add(u32::from(landed_back_on_excluded));
            snap_to_calendar(&mut next, calendar);
            refresh_cache(&mut next);
            x1 != bar.x1
        }
        DragAction::End => {
            let x2 = end_by_x(pointer, ctx.pixels_per_step, bar);
            next.x2 = x2;
            next.task.end = date_by_x(x2, bar.x2, bar.task.end, ctx);

            let task = &mut next.task;
            let landed_forward_on_excluded =
                task.end > task.cached_end() && calendar.is_excluded(task.end.date());
            task.days_duration = calendar
                .work_days_between(task.start, task.end)
                .saturating_add(u32::from(landed_forward_on_excluded));
            snap_to_calendar(&mut next, calendar);
            refresh_cache(&mut next);
            x2 != bar.x2
        }
        DragAction::Move => {
            let (x1, x2) = move_by_x(target_x1, ctx.pixels_per_step, bar);
            let moved = x1 != bar.x1;
            if moved {
                next.task.start = date_by_x(x1, bar.x1, bar.task.start, ctx);
                next.task.end = date_by_x(x2, bar.x2, bar.task.end, ctx);
                if next.task.days_duration == 0 {
                    next.task.days_duration = calendar.duration_of(next.task.start, next.task.end);
                }
                snap_to_calendar(&mut next, calendar);
                next.x1 = x1;
                next.x2 = x2;
            }
            moved
        }
    };

    next.task.start = start_of_day(next.task.start.date());
    next.task.end = end_of_day(next.task.end.date());
    (changed, next)
}

fn drag_milestone(
    target_x1: f64,
    action: DragAction,
    bar: &PositionedBar,
    ctx: &DragContext,
) -> (bool, PositionedBar) {
    let mut next = bar.clone();
    if action != DragAction::Move {
        return (false, next);
    }

    let (x1, x2) = move_by_x(target_x1, ctx.pixels_per_step, bar);
    let moved = x1 != bar.x1;
    if moved {
        next.task.start = date_by_x(x1, bar.x1, bar.task.start, ctx);
        next.task.end = next.task.start;
        next.x1 = x1;
        next.x2 = x2;
    }
    (moved, next)
}

fn snap_to_calendar(bar: &mut PositionedBar, calendar: &WorkCalendar) {
    let task = &mut bar.task;
    let (start, end) = calendar.correct(task.start, task.end, task.cached_start(), task.days_duration);
    task.start = start;
    task.end = end;
}

fn refresh_cache(bar: &mut PositionedBar) {
    bar.task.start_cache = Some(bar.task.start);
    bar.task.end_cache = Some(bar.task.end);
}

/// Round `x` to the step grid anchored at `origin`.
fn snap(x: f64, origin: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return x;
    }
    origin + ((x - origin) / step).round() * step
}

/// Percentage for a pointer over the bar, clamped to the bar's extent.
pub fn progress_by_x(x: f64, bar: &PositionedBar) -> f64 {
    if x >= bar.x2 {
        100.0
    } else if x <= bar.x1 {
        0.0
    } else {
        ((x - bar.x1) * 100.0 / bar.width()).round()
    }
}

/// New x1 for a start-handle drag; never closer than two handles to x2.
pub fn start_by_x(x: f64, step: f64, bar: &PositionedBar) -> f64 {
    snap(x, bar.x1, step).min(bar.x2 - bar.min_width())
}

/// New x2 for an end-handle drag; never closer than two handles to x1.
pub fn end_by_x(x: f64, step: f64, bar: &PositionedBar) -> f64 {
    snap(x, bar.x2, step).max(bar.x1 + bar.min_width())
}

/// New `(x1, x2)` when the bar's left edge follows `x`, width unchanged.
pub fn move_by_x(x: f64, step: f64, bar: &PositionedBar) -> (f64, f64) {
    let x1 = snap(x, bar.x1, step);
    (x1, x1 + bar.width())
}

/// The date `x` lands on, measured from an edge at `edge_x` showing
/// `edge_date`. Dates are local wall-clock times, so no UTC offset
/// correction applies. Offsets past the representable range clamp to
/// `NaiveDateTime::MIN`/`MAX`.
pub fn date_by_x(x: f64, edge_x: f64, edge_date: NaiveDateTime, ctx: &DragContext) -> NaiveDateTime {
    if ctx.pixels_per_step <= 0.0 || !ctx.pixels_per_step.is_finite() {
        return edge_date;
    }
    let millis = ((x - edge_x) / ctx.pixels_per_step * ctx.ms_per_step as f64).round();
    if millis.is_nan() {
        return edge_date;
    }
    let bound = if millis > 0.0 {
        NaiveDateTime::MAX
    } else {
        NaiveDateTime::MIN
    };
    if millis.abs() >= MAX_OFFSET_MS {
        return bound;
    }
    edge_date
        .checked_add_signed(chrono::Duration::milliseconds(millis as i64))
        .unwrap_or(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_to_nearest_step() {
        assert_eq!(snap(127.0, 100.0, 20.0), 120.0);
        assert_eq!(snap(131.0, 100.0, 20.0), 140.0);
        assert_eq!(snap(131.0, 100.0, 0.0), 131.0);
    }

    #[test]
    fn parses_action_names() {
        assert_eq!("Start".parse::<DragAction>(), Ok(DragAction::Start));
        assert!("resize".parse::<DragAction>().is_err());
        assert_eq!(DragAction::Progress.to_string(), "progress");
    }
}
