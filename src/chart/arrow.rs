//! Routing for the dependency arrows drawn from a parent bar to each of its
//! dependents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Direction, PositionedBar};

/// Stroke settings for dependency arrows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowStyle {
    /// Horizontal run out of the parent before turning.
    pub indent: f64,
    /// Corner radius; 0 draws square corners.
    pub radius: f64,
    pub stroke_width: f64,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            indent: 20.0,
            radius: 0.0,
            stroke_width: 1.5,
        }
    }
}

impl ArrowStyle {
    /// Corner radius, at most half a bar's height.
    pub fn safe_radius(&self, task_height: f64) -> f64 {
        if self.radius.is_nan() {
            return 0.0;
        }
        self.radius.clamp(0.0, (task_height / 2.0).max(0.0))
    }

    /// Indent of at least 8 pixels and never shorter than two corners.
    pub fn safe_indent(&self, task_height: f64) -> f64 {
        let indent = if self.indent.is_nan() { 0.0 } else { self.indent };
        indent.max(8.0).max(self.safe_radius(task_height) * 2.0)
    }

    pub fn safe_stroke_width(&self) -> f64 {
        if self.stroke_width.is_nan() {
            return 0.5;
        }
        self.stroke_width.clamp(0.5, 5.0)
    }
}

/// One step of an arrow path, in SVG path terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    HorizontalBy(f64),
    VerticalBy(f64),
    HorizontalTo(f64),
    VerticalTo(f64),
    /// Quarter-circle corner ending `(dx, dy)` away. `clockwise` is the SVG
    /// sweep flag.
    Arc {
        radius: f64,
        clockwise: bool,
        dx: f64,
        dy: f64,
    },
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo { x, y } => write!(f, "M {} {}", x, y),
            PathCommand::HorizontalBy(dx) => write!(f, "h {}", dx),
            PathCommand::VerticalBy(dy) => write!(f, "v {}", dy),
            PathCommand::HorizontalTo(x) => write!(f, "H {}", x),
            PathCommand::VerticalTo(y) => write!(f, "V {}", y),
            PathCommand::Arc {
                radius,
                clockwise,
                dx,
                dy,
            } => write!(
                f,
                "a {} {} 0 0 {} {} {}",
                radius,
                radius,
                u8::from(*clockwise),
                dx,
                dy
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: usize,
    pub to: usize,
    pub path: Vec<PathCommand>,
    /// Tip first, then the two back corners.
    pub head: [(f64, f64); 3],
    pub stroke_width: f64,
}

impl Arrow {
    /// The path as an SVG `d` attribute.
    pub fn path_data(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Path builder that drops corners when the radius is zero.
struct PathBuilder {
    radius: f64,
    commands: Vec<PathCommand>,
}

impl PathBuilder {
    fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    fn corner(&mut self, clockwise: bool, dx_sign: f64, dy_sign: f64) {
        if self.radius > 0.0 {
            self.commands.push(PathCommand::Arc {
                radius: self.radius,
                clockwise,
                dx: dx_sign * self.radius,
                dy: dy_sign * self.radius,
            });
        }
    }
}

/// Route an arrow from `from` (the parent) to `to` (the dependent).
///
/// The line leaves the parent's finishing edge, drops to the row boundary,
/// doubles back when the dependent starts too close, then runs into the
/// dependent's starting edge. Right-to-left routes are the mirror image.
pub fn route(
    from: &PositionedBar,
    to: &PositionedBar,
    row_height: f64,
    task_height: f64,
    style: &ArrowStyle,
    direction: Direction,
) -> Arrow {
    let radius = style.safe_radius(task_height);
    let indent = style.safe_indent(task_height);
    let stroke_width = style.safe_stroke_width();
    let going_up = from.index > to.index;
    let row_sign = if going_up { -1.0 } else { 1.0 };
    // Corners turning toward the next row sweep clockwise when heading down.
    let turn = !going_up;
    let from_mid = from.y + task_height / 2.0;
    let to_mid = to.y + task_height / 2.0;
    let drop = row_sign * row_height / 2.0 - row_sign * radius * 2.0;

    let mut path = PathBuilder {
        radius,
        commands: Vec::with_capacity(10),
    };
    let head;
    match direction {
        Direction::Ltr => {
            let from_end = from.x2 + indent * 2.0;
            let doubles_back = from_end >= to.x1 + indent;
            path.push(PathCommand::MoveTo {
                x: from.x2 - radius,
                y: from_mid,
            });
            path.push(PathCommand::HorizontalBy(indent - radius));
            path.corner(turn, 1.0, row_sign);
            path.push(PathCommand::VerticalBy(drop));
            if doubles_back {
                path.corner(turn, -1.0, row_sign);
                path.push(PathCommand::HorizontalTo(to.x1 - indent + radius));
                path.corner(!turn, -1.0, row_sign);
            }
            path.push(PathCommand::VerticalTo(to_mid - row_sign * radius));
            path.corner(!turn, 1.0, row_sign);
            let run = if doubles_back {
                indent - radius
            } else if from_end > to.x1 {
                indent
            } else {
                to.x1 - from.x2 - indent
            };
            path.push(PathCommand::HorizontalBy(run - stroke_width));
            head = [
                (to.x1, to_mid),
                (to.x1 - 5.0, to_mid - 5.0),
                (to.x1 - 5.0, to_mid + 5.0),
            ];
        }
        Direction::Rtl => {
            let from_end = from.x1 - indent * 2.0;
            let doubles_back = from_end <= to.x2;
            path.push(PathCommand::MoveTo {
                x: from.x1 + radius,
                y: from_mid,
            });
            path.push(PathCommand::HorizontalBy(-(indent - radius)));
            path.corner(!turn, -1.0, row_sign);
            path.push(PathCommand::VerticalBy(drop));
            if doubles_back {
                path.corner(!turn, 1.0, row_sign);
                path.push(PathCommand::HorizontalTo(to.x2 + indent - radius));
                path.corner(turn, 1.0, row_sign);
            }
            path.push(PathCommand::VerticalTo(to_mid - row_sign * radius));
            path.corner(turn, -1.0, row_sign);
            let run = if doubles_back {
                -(indent - radius)
            } else {
                to.x2 - from.x1 + indent
            };
            path.push(PathCommand::HorizontalBy(run));
            head = [
                (to.x2, to_mid),
                (to.x2 + 5.0, to_mid + 5.0),
                (to.x2 + 5.0, to_mid - 5.0),
            ];
        }
    }

    Arrow {
        from: from.index,
        to: to.index,
        path: path.commands,
        head,
        stroke_width,
    }
}

/// Arrows for every parent → child link in `bars`.
pub fn route_all(
    bars: &[PositionedBar],
    row_height: f64,
    task_height: f64,
    style: &ArrowStyle,
    direction: Direction,
) -> Vec<Arrow> {
    bars.iter()
        .flat_map(|parent| {
            parent.children.iter().filter_map(move |&child| {
                bars.get(child)
                    .map(|child| route(parent, child, row_height, task_height, style, direction))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::layout::{layout, LayoutConfig};
    use crate::model::{DateAxis, Task, TimelineScale};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn arrows_for(child_start: u32, radius: f64, direction: Direction) -> Vec<Arrow> {
        let axis = DateAxis::seed(day(1), day(31), TimelineScale::Day).unwrap();
        let tasks = vec![
            Task::new("a", "A", day(4), day(5)),
            Task::new("b", "B", day(child_start), day(child_start + 1)).with_dependency("a"),
        ];
        let config = LayoutConfig {
            direction,
            ..LayoutConfig::default()
        };
        let out = layout(&tasks, &axis, &config);
        let style = ArrowStyle {
            radius,
            ..ArrowStyle::default()
        };
        route_all(&out.bars, config.row_height, config.task_height, &style, direction)
    }

    #[test]
    fn clear_gap_runs_straight_to_the_child() {
        let arrows = arrows_for(8, 0.0, Direction::Ltr);
        assert_eq!(arrows.len(), 1);
        assert_eq!((arrows[0].from, arrows[0].to), (0, 1));
        assert_eq!(arrows[0].path_data(), "M 300 25 h 20 v 25 V 75 h 98.5");
        assert_eq!(arrows[0].head[0], (420.0, 75.0));
    }

    #[test]
    fn overlapping_child_doubles_back() {
        let arrows = arrows_for(5, 0.0, Direction::Ltr);
        assert_eq!(arrows[0].path_data(), "M 300 25 h 20 v 25 H 220 V 75 h 18.5");
    }

    #[test]
    fn rounded_corners() {
        let arrows = arrows_for(8, 5.0, Direction::Ltr);
        assert_eq!(
            arrows[0].path_data(),
            "M 295 25 h 15 a 5 5 0 0 1 5 5 v 15 V 70 a 5 5 0 0 0 5 5 h 98.5"
        );

        let arrows = arrows_for(5, 5.0, Direction::Ltr);
        assert_eq!(
            arrows[0].path_data(),
            "M 295 25 h 15 a 5 5 0 0 1 5 5 v 15 a 5 5 0 0 1 -5 5 H 225 \
             a 5 5 0 0 0 -5 5 V 70 a 5 5 0 0 0 5 5 h 13.5"
        );
    }

    #[test]
    fn right_to_left_mirrors_the_route() {
        let square = arrows_for(8, 0.0, Direction::Rtl);
        assert_eq!(square[0].path_data(), "M 1620 25 h -20 v 25 V 75 h -100");
        assert_eq!(square[0].head[0], (1500.0, 75.0));

        let rounded = arrows_for(8, 5.0, Direction::Rtl);
        assert_eq!(
            rounded[0].path_data(),
            "M 1625 25 h -15 a 5 5 0 0 0 -5 5 v 15 V 70 a 5 5 0 0 1 -5 5 h -100"
        );
    }

    #[test]
    fn style_is_clamped() {
        let style = ArrowStyle {
            indent: 2.0,
            radius: 40.0,
            stroke_width: 9.0,
        };
        assert_eq!(style.safe_radius(30.0), 15.0);
        assert_eq!(style.safe_indent(30.0), 30.0);
        assert_eq!(style.safe_indent(0.0), 8.0);
        assert_eq!(style.safe_stroke_width(), 5.0);
    }
}
