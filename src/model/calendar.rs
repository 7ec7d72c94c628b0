use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How many single-day steps the start date may take while looking for a
/// work day. Bounds the walk when every weekday is excluded.
pub const MAX_SNAP_STEPS: usize = 7;

/// Midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.000 on `date`, the instant a task's end is pinned to.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Signed whole calendar days from `from` to `to`, ignoring time of day.
pub fn days_diff(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to.date() - from.date()).num_days()
}

/// A work calendar defined by the weekdays that are not worked.
///
/// Weekdays are numbered from Sunday: `0` = Sunday … `6` = Saturday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct WorkCalendar {
    excluded: [bool; 7],
}

impl WorkCalendar {
    /// Build a calendar from Sunday-based weekday numbers. Numbers outside
    /// `0..=6` are ignored.
    pub fn new(excluded_weekdays: &[u8]) -> Self {
        let mut excluded = [false; 7];
        for &day in excluded_weekdays {
            match excluded.get_mut(day as usize) {
                Some(slot) => *slot = true,
                None => tracing::warn!(weekday = day, "ignoring weekday number outside 0..=6"),
            }
        }
        Self { excluded }
    }

    /// Saturday and Sunday off.
    pub fn weekends() -> Self {
        Self::new(&[0, 6])
    }

    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        !self.is_excluded(date)
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.iter().filter(|e| **e).count()
    }

    /// Whether calendar correction applies at all. An empty set excludes
    /// nothing; a full set has no day to land on.
    pub fn is_active(&self) -> bool {
        (1..7).contains(&self.excluded_count())
    }

    pub fn excluded_weekdays(&self) -> Vec<u8> {
        (0u8..7).filter(|d| self.excluded[*d as usize]).collect()
    }

    /// Count work days starting at `start` and stepping one day at a time
    /// while still before `end`.
    pub fn work_days_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> u32 {
        if end <= start {
            return 0;
        }
        let whole = (end - start).num_days();
        let steps = match start.checked_add_days(Days::new(whole as u64)) {
            Some(cursor) if cursor < end => whole + 1,
            _ => whole,
        };

        let first = start.weekday().num_days_from_sunday() as i64;
        let per_week = (7 - self.excluded_count()) as i64;
        let partial = (0..steps % 7)
            .filter(|offset| !self.excluded[((first + offset) % 7) as usize])
            .count() as i64;
        u32::try_from(steps / 7 * per_week + partial).unwrap_or(u32::MAX)
    }

    /// Work-day length of a task running from `start` through `end`, never
    /// less than one day.
    pub fn duration_of(&self, start: NaiveDateTime, end: NaiveDateTime) -> u32 {
        self.work_days_between(start_of_day(start.date()), end).max(1)
    }

    /// Snap a task's dates onto the calendar.
    ///
    /// The start walks off excluded days in the direction it was dragged
    /// (backward when it now lies before `cached_start`), then the end is
    /// placed `days_duration` work days later, counting the start itself.
    /// Both dates come back normalized to whole-day boundaries. An inactive
    /// calendar only normalizes.
    pub fn correct(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        cached_start: NaiveDateTime,
        days_duration: u32,
    ) -> (NaiveDateTime, NaiveDateTime) {
        if !self.is_active() {
            return (start_of_day(start.date()), end_of_day(end.date()));
        }

        let backward = start < cached_start;
        let mut start_day = start.date();
        let mut attempts = 0;
        while self.is_excluded(start_day) {
            let next = if backward {
                start_day.pred_opt()
            } else {
                start_day.succ_opt()
            };
            let Some(next) = next else {
                break;
            };
            start_day = next;
            attempts += 1;
            if attempts >= MAX_SNAP_STEPS {
                break;
            }
        }

        let end_day = self.nth_work_day_after(start_day, days_duration.saturating_sub(1));
        (start_of_day(start_day), end_of_day(end_day))
    }

    /// The `count`-th work day after `day`, stopping at the last
    /// representable date. Whole weeks are skipped in one jump.
    fn nth_work_day_after(&self, day: NaiveDate, count: u32) -> NaiveDate {
        if count == 0 {
            return day;
        }
        let count = count as u64;
        let per_week = (7 - self.excluded_count()).max(1) as u64;
        let weeks = (count - 1) / per_week;
        let mut remaining = count - weeks * per_week;
        let mut cursor = day
            .checked_add_days(Days::new(weeks * 7))
            .unwrap_or(NaiveDate::MAX);
        while remaining > 0 {
            let Some(next) = cursor.succ_opt() else {
                break;
            };
            cursor = next;
            if self.is_work_day(cursor) {
                remaining -= 1;
            }
        }
        cursor
    }
}

impl From<Vec<u8>> for WorkCalendar {
    fn from(days: Vec<u8>) -> Self {
        Self::new(&days)
    }
}

impl From<WorkCalendar> for Vec<u8> {
    fn from(calendar: WorkCalendar) -> Self {
        calendar.excluded_weekdays()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        start_of_day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn out_of_range_weekdays_are_dropped() {
        let cal = WorkCalendar::new(&[0, 6, 9]);
        assert_eq!(cal.excluded_weekdays(), vec![0, 6]);
    }

    #[test]
    fn full_week_is_inactive() {
        assert!(!WorkCalendar::new(&[0, 1, 2, 3, 4, 5, 6]).is_active());
        assert!(!WorkCalendar::default().is_active());
        assert!(WorkCalendar::weekends().is_active());
    }

    #[test]
    fn counts_work_days_over_a_weekend() {
        // Friday 2024-03-08 through Tuesday 2024-03-12.
        let cal = WorkCalendar::weekends();
        let end = end_of_day(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert_eq!(cal.work_days_between(at(2024, 3, 8), end), 3);
    }

    #[test]
    fn days_diff_ignores_time_of_day() {
        let end = end_of_day(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(days_diff(at(2024, 3, 4), end), 2);
        assert_eq!(days_diff(end, at(2024, 3, 4)), -2);
    }
}
