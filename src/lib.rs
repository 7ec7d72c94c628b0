//! Gantt chart geometry: turns task records into positioned bars on a date
//! axis and turns pointer drags back into calendar-legal dates.
//!
//! ```no_run
//! use gantt_layout::chart::{layout, LayoutConfig};
//! use gantt_layout::model::{DateAxis, Task, TimelineScale};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
//! let axis = DateAxis::seed(start, end, TimelineScale::Day).unwrap();
//! let tasks = vec![Task::new("1", "Design", start, end)];
//! let out = layout(&tasks, &axis, &LayoutConfig::default());
//! assert_eq!(out.bars.len(), 1);
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod io;
pub mod model;

pub use error::{GanttError, Result};
