//! Chargeable day and hour counts for leave requests.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    models::leave_request::{LeaveCategory, LeaveRequest},
    services::holiday::HolidayCalendar,
    utils::time::{minutes_of_day, parse_hhmm},
};

pub const HALF_DAY: f64 = 0.5;

/// Hours per day assumed for extra-time leave without a usable time window.
///
/// Kept as-is even though every other figure is calendar exact; results that
/// rely on it are reported with `estimated = true`.
pub const FALLBACK_EXTRA_TIME_HOURS_PER_DAY: f64 = 8.25;

/// Days charged for a leave between two inclusive dates.
///
/// Sundays and declared holidays are free. Half-day leave always costs half a
/// day. An inverted range costs nothing.
pub fn chargeable_days(
    start: NaiveDate,
    end: NaiveDate,
    calendar: &HolidayCalendar,
    category: LeaveCategory,
) -> f64 {
    if start > end {
        return 0.0;
    }
    if category == LeaveCategory::HalfDay {
        return HALF_DAY;
    }
    calendar.working_days_between(start, end) as f64
}

/// Chargeable days of a whole leave request.
pub fn leave_days(leave: &LeaveRequest, calendar: &HolidayCalendar) -> f64 {
    chargeable_days(leave.start_date, leave.end_date, calendar, leave.category)
}

/// Length of a `HH:mm`..`HH:mm` window in hours. An end before the start
/// crosses midnight.
pub fn daily_window_hours(start_time: Option<&str>, end_time: Option<&str>) -> Option<f64> {
    let start = minutes_of_day(parse_hhmm(start_time?)?) as i64;
    let end = minutes_of_day(parse_hhmm(end_time?)?) as i64;
    let minutes = if end < start { end + 24 * 60 - start } else { end - start };
    Some(minutes as f64 / 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtraTimeHours {
    pub hours: f64,
    pub hours_per_day: f64,
    pub working_days: u32,
    /// The fallback rate was used because the time window was missing or invalid.
    pub estimated: bool,
}

pub fn extra_time_hours(
    start: NaiveDate,
    end: NaiveDate,
    start_time: Option<&str>,
    end_time: Option<&str>,
    calendar: &HolidayCalendar,
) -> ExtraTimeHours {
    let working_days = calendar.working_days_between(start, end);
    let (hours_per_day, estimated) = match daily_window_hours(start_time, end_time) {
        Some(hours) => (hours, false),
        None => {
            tracing::warn!(
                %start,
                %end,
                ?start_time,
                ?end_time,
                "extra-time leave without a usable time window, using {}h/day",
                FALLBACK_EXTRA_TIME_HOURS_PER_DAY
            );
            (FALLBACK_EXTRA_TIME_HOURS_PER_DAY, true)
        }
    };
    ExtraTimeHours {
        hours: hours_per_day * working_days as f64,
        hours_per_day,
        working_days,
        estimated,
    }
}
