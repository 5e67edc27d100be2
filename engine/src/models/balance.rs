//! Derived balance figures and the per-month ledger entry that anchors carryover.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    types::{AttendanceId, LeaveRequestId, UserId},
    utils::time::month_bounds,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive calendar window a balance is computed over.
pub struct BalancePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BalancePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(EngineError::InvalidRange(format!(
                "period end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let (start, end) = month_bounds(year, month).ok_or_else(|| {
            EngineError::InvalidRange(format!("invalid year/month: {}/{}", year, month))
        })?;
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let (start, end) = month_bounds(date.year(), date.month()).unwrap_or((date, date));
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection with another inclusive range, if any.
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start <= end).then_some((start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaidLeaveBalance {
    pub allocation: u32,
    pub used_days: f64,
    pub available_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// An attendance record on a day also covered by approved leave. The day is
/// left out of low/extra totals and surfaced for an administrative correction.
pub struct AttendanceConflict {
    pub attendance_id: AttendanceId,
    pub leave_request_id: LeaveRequestId,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Balance snapshot for one employee over one period.
pub struct EmployeeBalance {
    pub user_id: UserId,
    pub period: BalancePeriod,
    pub paid_leave: PaidLeaveBalance,
    pub extra_time_leave_hours_taken: f64,
    /// Some extra-time leave had no usable time window and was charged at the
    /// flat fallback rate.
    #[serde(default)]
    pub extra_time_hours_estimated: bool,
    /// Includes low time carried in from the previous month.
    pub total_low_time_seconds: i64,
    pub total_extra_time_seconds: i64,
    pub extra_time_worked_hours: f64,
    pub remaining_extra_time_leave_hours: f64,
    /// Set only when evaluated on the last day of the month.
    pub is_month_end: bool,
    /// Unpaid extra-time leave converted to low time for next month.
    pub carryover_extra_time_leave_seconds: i64,
    /// Net low-time deficit carried into next month.
    pub carryover_low_time_seconds: i64,
    pub conflicts: Vec<AttendanceConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Ledger entry written once per employee per month at month end.
pub struct MonthlyBalanceSnapshot {
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub used_paid_leave_days: f64,
    pub extra_time_leave_hours_taken: f64,
    pub total_low_time_seconds: i64,
    pub total_extra_time_seconds: i64,
    pub remaining_extra_time_leave_hours: f64,
    pub carryover_extra_time_leave_seconds: i64,
    pub carryover_low_time_seconds: i64,
    pub closed_at: DateTime<Utc>,
}

impl MonthlyBalanceSnapshot {
    pub fn from_balance(balance: &EmployeeBalance, closed_at: DateTime<Utc>) -> Self {
        Self {
            user_id: balance.user_id,
            year: balance.period.end.year(),
            month: balance.period.end.month(),
            used_paid_leave_days: balance.paid_leave.used_days,
            extra_time_leave_hours_taken: balance.extra_time_leave_hours_taken,
            total_low_time_seconds: balance.total_low_time_seconds,
            total_extra_time_seconds: balance.total_extra_time_seconds,
            remaining_extra_time_leave_hours: balance.remaining_extra_time_leave_hours,
            carryover_extra_time_leave_seconds: balance.carryover_extra_time_leave_seconds,
            carryover_low_time_seconds: balance.carryover_low_time_seconds,
            closed_at,
        }
    }

    /// Low time the following month starts with.
    pub fn carried_low_time_seconds(&self) -> i64 {
        self.carryover_extra_time_leave_seconds + self.carryover_low_time_seconds
    }
}
