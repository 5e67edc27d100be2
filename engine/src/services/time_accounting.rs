//! Worked-time arithmetic for a single attendance record.
//!
//! Completed totals only count closed breaks. The live timer additionally
//! counts a break that is still open and keeps it out of the work timer.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    models::{attendance::AttendanceRecord, break_record::Break},
    utils::time::{format_hms, format_hours_minutes},
};

/// 8h15m.
pub const MIN_NORMAL_SECONDS: i64 = 29_700;
/// 8h30m.
pub const MAX_NORMAL_SECONDS: i64 = 30_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkClassification {
    Low { shortage_seconds: i64 },
    Normal,
    Extra { surplus_seconds: i64 },
}

impl WorkClassification {
    pub fn low_seconds(&self) -> i64 {
        match self {
            WorkClassification::Low { shortage_seconds } => *shortage_seconds,
            _ => 0,
        }
    }

    pub fn extra_seconds(&self) -> i64 {
        match self {
            WorkClassification::Extra { surplus_seconds } => *surplus_seconds,
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkClassification::Low { .. } => "low",
            WorkClassification::Normal => "normal",
            WorkClassification::Extra { .. } => "extra",
        }
    }
}

pub fn classify(net_worked_seconds: i64) -> WorkClassification {
    if net_worked_seconds < MIN_NORMAL_SECONDS {
        WorkClassification::Low {
            shortage_seconds: MIN_NORMAL_SECONDS - net_worked_seconds,
        }
    } else if net_worked_seconds > MAX_NORMAL_SECONDS {
        WorkClassification::Extra {
            surplus_seconds: net_worked_seconds - MAX_NORMAL_SECONDS,
        }
    } else {
        WorkClassification::Normal
    }
}

/// Sum of closed breaks.
pub fn break_seconds(breaks: &[Break]) -> i64 {
    breaks.iter().map(Break::completed_seconds).sum()
}

/// `max(0, (check_out - check_in) - breaks)`.
pub fn net_worked_seconds(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    breaks: &[Break],
) -> i64 {
    let session = (check_out - check_in).num_seconds().max(0);
    (session - break_seconds(breaks)).max(0)
}

/// Net seconds for a record with both check-in and check-out.
pub fn completed_net_seconds(record: &AttendanceRecord) -> Option<i64> {
    match (record.check_in, record.check_out) {
        (Some(check_in), Some(check_out)) => {
            Some(net_worked_seconds(check_in, check_out, &record.breaks))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    pub session_seconds: i64,
    pub break_seconds: i64,
    pub net_worked_seconds: i64,
    pub classification: WorkClassification,
}

/// Totals for a completed day; `None` until the employee has clocked out.
pub fn day_totals(record: &AttendanceRecord) -> Option<DailyTotals> {
    let (check_in, check_out) = (record.check_in?, record.check_out?);
    let net = net_worked_seconds(check_in, check_out, &record.breaks);
    Some(DailyTotals {
        session_seconds: (check_out - check_in).num_seconds().max(0),
        break_seconds: break_seconds(&record.breaks),
        net_worked_seconds: net,
        classification: classify(net),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiveTimer {
    pub worked_seconds: i64,
    pub break_seconds: i64,
    pub on_break: bool,
    pub is_complete: bool,
}

impl LiveTimer {
    pub fn worked_display(&self) -> String {
        format_hms(self.worked_seconds)
    }

    pub fn break_display(&self) -> String {
        format_hms(self.break_seconds)
    }
}

/// Running work and break timers as of `now`.
pub fn live_timer(record: &AttendanceRecord, now: NaiveDateTime) -> LiveTimer {
    let Some(check_in) = record.check_in else {
        return LiveTimer {
            worked_seconds: 0,
            break_seconds: 0,
            on_break: false,
            is_complete: false,
        };
    };

    if let Some(totals) = day_totals(record) {
        return LiveTimer {
            worked_seconds: totals.net_worked_seconds,
            break_seconds: totals.break_seconds,
            on_break: false,
            is_complete: true,
        };
    }

    let breaks: i64 = record.breaks.iter().map(|b| b.elapsed_seconds(now)).sum();
    let elapsed = (now - check_in).num_seconds().max(0);
    LiveTimer {
        worked_seconds: (elapsed - breaks).max(0),
        break_seconds: breaks,
        on_break: record.active_break().is_some(),
        is_complete: false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Display row for one attendance record.
pub struct DaySummary {
    pub date: NaiveDate,
    pub check_in: String,
    pub check_out: String,
    pub worked: String,
    pub breaks: String,
    pub classification: Option<WorkClassification>,
}

pub fn summarize_day(record: &AttendanceRecord) -> DaySummary {
    let time_or_dash = |t: Option<NaiveDateTime>| {
        t.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let totals = day_totals(record);
    DaySummary {
        date: record.date,
        check_in: time_or_dash(record.check_in),
        check_out: time_or_dash(record.check_out),
        worked: totals
            .map(|t| format_hours_minutes(t.net_worked_seconds))
            .unwrap_or_else(|| "-".to_string()),
        breaks: format_hours_minutes(break_seconds(&record.breaks)),
        classification: totals.map(|t| t.classification),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub year: i32,
    pub month: u32,
    pub total_work_hours: f64,
    pub total_work_days: u32,
    pub average_daily_hours: f64,
    pub low_days: u32,
    pub normal_days: u32,
    pub extra_days: u32,
}

/// Monthly totals over the completed days of `records` that fall in the month.
pub fn summarize_month(records: &[AttendanceRecord], year: i32, month: u32) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        year,
        month,
        total_work_hours: 0.0,
        total_work_days: 0,
        average_daily_hours: 0.0,
        low_days: 0,
        normal_days: 0,
        extra_days: 0,
    };

    let mut total_seconds = 0i64;
    for totals in records
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .filter_map(day_totals)
    {
        total_seconds += totals.net_worked_seconds;
        summary.total_work_days += 1;
        match totals.classification {
            WorkClassification::Low { .. } => summary.low_days += 1,
            WorkClassification::Normal => summary.normal_days += 1,
            WorkClassification::Extra { .. } => summary.extra_days += 1,
        }
    }

    summary.total_work_hours = total_seconds as f64 / 3600.0;
    if summary.total_work_days > 0 {
        summary.average_daily_hours = summary.total_work_hours / summary.total_work_days as f64;
    }
    summary
}
