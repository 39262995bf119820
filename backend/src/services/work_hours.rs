//! Fixed work-window model and the per-date remaining-capacity calculator.
//!
//! The working day consists of two disjoint time-of-day windows. Given a
//! day-off interval, [`remaining_capacity`] answers, for every calendar date
//! the interval touches, how many minutes of work capacity are left once the
//! overlap with the windows is subtracted. Weekend days carry no capacity.
//!
//! Everything here is a pure function of its inputs; durations are integer
//! minutes throughout so no clock-time wrap-around arithmetic can occur.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::error::AppError;

/// A fixed time-of-day interval during which work may be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    /// Window start, minutes since midnight.
    start_minute: u32,
    /// Window end, minutes since midnight. Always greater than the start.
    end_minute: u32,
}

impl WorkWindow {
    const fn from_hm(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        let start = start_hour * 60 + start_minute;
        let end = end_hour * 60 + end_minute;
        assert!(start < end, "work window start must precede its end");
        assert!(end <= 24 * 60, "work window must end within the day");
        Self {
            start_minute: start,
            end_minute: end,
        }
    }

    /// Duration of the window in minutes.
    pub const fn minutes(&self) -> i64 {
        (self.end_minute - self.start_minute) as i64
    }

    /// The window projected onto a concrete calendar date.
    fn bounds_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let at = |minute: u32| {
            date.and_hms_opt(minute / 60, minute % 60, 0)
                .expect("work window minute lies within the day")
        };
        (at(self.start_minute), at(self.end_minute))
    }
}

/// The two fixed work windows of a working day (local time).
pub const WORK_WINDOWS: [WorkWindow; 2] = [
    WorkWindow::from_hm(9, 0, 12, 0),
    WorkWindow::from_hm(13, 30, 18, 0),
];

/// Total loggable minutes per non-weekend day.
pub const DAILY_CAPACITY_MINUTES: i64 = WORK_WINDOWS[0].minutes() + WORK_WINDOWS[1].minutes();

/// Converts a fractional hour count to whole minutes.
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0).round() as i64
}

/// Converts whole minutes to fractional hours.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

/// True for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Remaining work capacity, in minutes, for every calendar date covered by
/// the day-off interval `[start, end]`.
///
/// Weekend dates map to zero. On working dates the overlap between the
/// interval and each work window is subtracted from [`DAILY_CAPACITY_MINUTES`];
/// a date the interval does not intersect at all keeps its full capacity.
/// Fails with `InvalidInterval` unless `end > start`.
pub fn remaining_capacity(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<BTreeMap<NaiveDate, i64>, AppError> {
    if end <= start {
        return Err(AppError::InvalidInterval(
            "interval end must be after its start".to_string(),
        ));
    }

    let mut per_date = BTreeMap::new();
    let mut date = start.date();
    let last = end.date();
    while date <= last {
        per_date.insert(date, remaining_minutes_on(date, start, end));
        date = date
            .succ_opt()
            .ok_or_else(|| AppError::InvalidInterval("interval exceeds the calendar".to_string()))?;
    }

    Ok(per_date)
}

fn remaining_minutes_on(date: NaiveDate, start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if is_weekend(date) {
        return 0;
    }

    let mut overlap_seconds = 0i64;
    for window in &WORK_WINDOWS {
        let (window_start, window_end) = window.bounds_on(date);
        let lo = if start > window_start { start } else { window_start };
        let hi = if end < window_end { end } else { window_end };
        if hi > lo {
            overlap_seconds += (hi - lo).num_seconds();
        }
    }

    (DAILY_CAPACITY_MINUTES - overlap_seconds / 60).max(0)
}
