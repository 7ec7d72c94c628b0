pub mod bar;
pub mod calendar;
pub mod task;
pub mod timeline;

pub use bar::{BarColors, BarKind, Direction, PositionedBar};
pub use calendar::WorkCalendar;
pub use task::{Task, TaskStyles, TaskType};
pub use timeline::{DateAxis, TimelineScale};
