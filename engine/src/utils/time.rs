use chrono::{
    DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns the current wall-clock time in the configured timezone.
///
/// Attendance timestamps are stored as local wall-clock values, so this is the
/// value callers pass to the engine as `now`.
pub fn now_local(tz: &Tz) -> NaiveDateTime {
    now_in_timezone(tz).naive_local()
}

/// Returns today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    now_in_timezone(tz).date_naive()
}

/// Parses a `HH:mm` time-of-day string.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parses a timestamp in any of the shapes found in historical attendance data.
///
/// RFC 3339 values keep the wall-clock time of their own offset.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = value.parse::<NaiveDateTime>() {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Serde helper for optional timestamps: malformed values become `None`.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|value| {
        let parsed = parse_timestamp(value);
        if parsed.is_none() {
            tracing::warn!(value, "discarding unparseable timestamp");
        }
        parsed
    }))
}

/// Formats seconds as `HH:MM:SS` for running timers. Negative input shows zero.
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Formats seconds as `8h 15m`.
pub fn format_hours_minutes(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Formats a date as `DD-MM-YYYY`, or `-` when absent.
pub fn format_date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Returns the first and last day (both inclusive) of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    month_bounds(date.year(), date.month())
        .map(|(_, end)| end)
        .unwrap_or(date)
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Calendar-aware month addition; the day clamps to the end of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
