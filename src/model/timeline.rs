use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::calendar::start_of_day;
use crate::error::{GanttError, Result};

/// Column granularity used when seeding an axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineScale {
    #[default]
    Day,
    Week,
    Month,
}

impl std::str::FromStr for TimelineScale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(TimelineScale::Day),
            "week" | "weeks" => Ok(TimelineScale::Week),
            "month" | "months" => Ok(TimelineScale::Month),
            other => Err(format!("unknown scale '{}' (expected day, week or month)", other)),
        }
    }
}

impl TimelineScale {
    /// Roughly one column's worth of time, used to pad a seeded axis.
    pub fn approx_step(self) -> chrono::Duration {
        match self {
            TimelineScale::Day => chrono::Duration::days(1),
            TimelineScale::Week => chrono::Duration::days(7),
            TimelineScale::Month => chrono::Duration::days(31),
        }
    }
}

/// The discretized date axis: one tick per chart column.
///
/// Ticks are strictly increasing. The gap between the first two ticks is
/// taken as the axis interval when mapping dates that fall outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAxis {
    ticks: Vec<NaiveDateTime>,
}

impl DateAxis {
    pub fn new(ticks: Vec<NaiveDateTime>) -> Result<Self> {
        if ticks.len() < 2 {
            return Err(GanttError::InvalidAxis(format!(
                "need at least two ticks, got {}",
                ticks.len()
            )));
        }
        if let Some(pair) = ticks.windows(2).find(|w| w[0] >= w[1]) {
            return Err(GanttError::InvalidAxis(format!(
                "ticks must be strictly increasing ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { ticks })
    }

    /// Ticks covering `start..=end` at the given scale. Weeks align to
    /// Monday and months to the first of the month; one extra tick past
    /// `end` keeps the last day inside the axis.
    pub fn seed(start: NaiveDate, end: NaiveDate, scale: TimelineScale) -> Result<Self> {
        let mut date = match scale {
            TimelineScale::Day => start,
            TimelineScale::Week => {
                let weekday = start.weekday().num_days_from_monday();
                start
                    .checked_sub_days(Days::new(weekday as u64))
                    .unwrap_or(start)
            }
            TimelineScale::Month => {
                NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap_or(start)
            }
        };

        let mut ticks = Vec::new();
        loop {
            ticks.push(start_of_day(date));
            if date > end {
                break;
            }
            let next = match scale {
                TimelineScale::Day => date.succ_opt(),
                TimelineScale::Week => date.checked_add_days(Days::new(7)),
                TimelineScale::Month => date
                    .with_day(1)
                    .and_then(|first| first.checked_add_months(Months::new(1))),
            };
            match next {
                Some(next) => date = next,
                None => break,
            }
        }
        Self::new(ticks)
    }

    pub fn ticks(&self) -> &[NaiveDateTime] {
        &self.ticks
    }

    pub fn first(&self) -> NaiveDateTime {
        self.ticks[0]
    }

    pub fn last(&self) -> NaiveDateTime {
        self.ticks[self.ticks.len() - 1]
    }

    /// Gap between the first two ticks.
    pub fn interval(&self) -> chrono::Duration {
        self.ticks[1] - self.ticks[0]
    }

    /// Full chart width for this axis.
    pub fn total_width(&self, column_width: f64) -> f64 {
        self.ticks.len() as f64 * column_width
    }

    /// Map an instant to an x offset: the column of the first tick at or
    /// after `date`. Dates outside the axis are extrapolated linearly from
    /// the axis interval, so they land at negative or beyond-range x.
    pub fn date_to_x(&self, date: NaiveDateTime, column_width: f64) -> f64 {
        let interval = self.interval_millis();
        if date < self.first() {
            let before = (self.first() - date).num_milliseconds() as f64;
            return -(before / interval) * column_width;
        }
        match self.ticks.iter().position(|t| *t >= date) {
            Some(index) => index as f64 * column_width,
            None => {
                let after = (date - self.last()).num_milliseconds() as f64;
                ((self.ticks.len() - 1) as f64 + after / interval) * column_width
            }
        }
    }

    /// How many pixels one drag step of `time_step_ms` covers.
    pub fn pixels_per_step(&self, column_width: f64, time_step_ms: i64) -> f64 {
        column_width * time_step_ms as f64 / self.interval_millis()
    }

    fn interval_millis(&self) -> f64 {
        self.interval().num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calendar::end_of_day;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_axis() -> DateAxis {
        DateAxis::seed(day(2024, 3, 1), day(2024, 3, 31), TimelineScale::Day).unwrap()
    }

    #[test]
    fn rejects_short_or_unordered_ticks() {
        assert!(DateAxis::new(vec![start_of_day(day(2024, 1, 1))]).is_err());
        let backwards = vec![start_of_day(day(2024, 1, 2)), start_of_day(day(2024, 1, 1))];
        assert!(matches!(
            DateAxis::new(backwards),
            Err(GanttError::InvalidAxis(_))
        ));
    }

    #[test]
    fn end_of_day_maps_to_next_column() {
        let axis = daily_axis();
        assert_eq!(axis.date_to_x(start_of_day(day(2024, 3, 4)), 60.0), 180.0);
        assert_eq!(axis.date_to_x(end_of_day(day(2024, 3, 4)), 60.0), 240.0);
    }

    #[test]
    fn extrapolates_outside_the_axis() {
        let axis = daily_axis();
        assert_eq!(axis.date_to_x(start_of_day(day(2024, 2, 28)), 60.0), -120.0);
        let last = axis.ticks().len() as f64 - 1.0;
        let beyond = axis.last() + chrono::Duration::days(3);
        assert_eq!(axis.date_to_x(beyond, 60.0), (last + 3.0) * 60.0);
    }

    #[test]
    fn week_axis_aligns_to_monday() {
        let axis = DateAxis::seed(day(2024, 3, 6), day(2024, 3, 20), TimelineScale::Week).unwrap();
        assert_eq!(axis.first().date(), day(2024, 3, 4));
        assert_eq!(axis.interval(), chrono::Duration::days(7));
        assert_eq!(axis.pixels_per_step(70.0, 86_400_000), 10.0);
    }
}
