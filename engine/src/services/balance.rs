//! Leave-balance reconciliation.
//!
//! Paid leave is charged in days against the employee's allocation. Extra-time
//! leave is a debt in hours that worked surplus pays off; whatever is left at
//! month end turns into low time for the next month.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::{EngineError, Result},
    models::{
        attendance::AttendanceRecord,
        balance::{
            AttendanceConflict, BalancePeriod, EmployeeBalance, MonthlyBalanceSnapshot,
            PaidLeaveBalance,
        },
        leave_request::{CreateLeaveRequest, HalfDayChargeType, LeaveCategory, LeaveRequest},
    },
    services::{
        holiday::HolidayCalendar,
        leave_days::{self, HALF_DAY},
        time_accounting,
    },
    types::UserId,
    utils::time::is_last_day_of_month,
    validation::{rules, Validate},
};

/// Hours charged for a half-day leave drawn from extra-time leave.
pub const HALF_DAY_EXTRA_TIME_HOURS: f64 = 4.0;

/// Everything the reconciler reads for one employee and one period.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub user_id: UserId,
    pub paid_leave_allocation: Option<u32>,
    pub leaves: &'a [LeaveRequest],
    pub attendance: &'a [AttendanceRecord],
    pub calendar: &'a HolidayCalendar,
    pub period: BalancePeriod,
    /// Snapshot of the month before `period`, if one was closed.
    pub prior: Option<&'a MonthlyBalanceSnapshot>,
}

fn approved_in_period<'a>(
    user_id: UserId,
    leaves: &'a [LeaveRequest],
    period: BalancePeriod,
) -> impl Iterator<Item = &'a LeaveRequest> + 'a {
    leaves.iter().filter(move |leave| {
        leave.user_id == user_id
            && leave.is_approved()
            && period.clip(leave.start_date, leave.end_date).is_some()
    })
}

/// Paid leave drawn from the allocation.
///
/// The allocation is not reset per month, so every approved leave that starts
/// on or before `through` is charged in full. `None` charges every approved
/// leave, which is what a new submission is checked against.
pub fn paid_leave_balance(
    allocation: Option<u32>,
    user_id: UserId,
    leaves: &[LeaveRequest],
    calendar: &HolidayCalendar,
    through: Option<NaiveDate>,
) -> PaidLeaveBalance {
    let allocation = allocation.unwrap_or(0);
    let used_days: f64 = leaves
        .iter()
        .filter(|leave| {
            leave.user_id == user_id
                && leave.is_approved()
                && through.map_or(true, |through| leave.start_date <= through)
        })
        .map(|leave| match leave.category {
            LeaveCategory::Paid => leave_days::leave_days(leave, calendar),
            LeaveCategory::HalfDay
                if leave.half_day_charge() == Some(HalfDayChargeType::Paid) =>
            {
                HALF_DAY
            }
            _ => 0.0,
        })
        .sum();

    PaidLeaveBalance {
        allocation,
        used_days,
        available_days: allocation as f64 - used_days,
    }
}

/// Extra-time leave charged to a period, in hours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtraTimeLeaveTaken {
    pub hours: f64,
    /// At least one leave was charged at the flat fallback rate.
    pub estimated: bool,
}

pub fn extra_time_leave_hours_taken(
    user_id: UserId,
    leaves: &[LeaveRequest],
    calendar: &HolidayCalendar,
    period: BalancePeriod,
) -> ExtraTimeLeaveTaken {
    approved_in_period(user_id, leaves, period).fold(
        ExtraTimeLeaveTaken::default(),
        |mut taken, leave| {
            match leave.category {
                LeaveCategory::ExtraTime => {
                    if let Some((start, end)) = period.clip(leave.start_date, leave.end_date) {
                        let hours = leave_days::extra_time_hours(
                            start,
                            end,
                            leave.start_time.as_deref(),
                            leave.end_time.as_deref(),
                            calendar,
                        );
                        taken.hours += hours.hours;
                        taken.estimated |= hours.estimated;
                    }
                }
                LeaveCategory::HalfDay
                    if leave.half_day_charge() == Some(HalfDayChargeType::ExtraTime) =>
                {
                    taken.hours += HALF_DAY_EXTRA_TIME_HOURS;
                }
                _ => {}
            }
            taken
        },
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkedTimeTotals {
    pub low_seconds: i64,
    pub extra_seconds: i64,
    pub conflicts: Vec<AttendanceConflict>,
}

/// Low and extra time over completed days in the period. Days covered by
/// approved leave are skipped and reported as conflicts when clocked.
pub fn worked_time_totals(
    user_id: UserId,
    attendance: &[AttendanceRecord],
    leaves: &[LeaveRequest],
    period: BalancePeriod,
) -> WorkedTimeTotals {
    let approved: Vec<&LeaveRequest> = approved_in_period(user_id, leaves, period).collect();
    let mut totals = WorkedTimeTotals::default();

    for record in attendance
        .iter()
        .filter(|r| r.user_id == user_id && period.contains(r.date))
    {
        if let Some(leave) = approved.iter().find(|leave| leave.covers(record.date)) {
            if record.check_in.is_some() {
                tracing::warn!(
                    attendance_id = %record.id,
                    leave_request_id = %leave.id,
                    date = %record.date,
                    "attendance recorded on an approved leave day"
                );
                totals.conflicts.push(AttendanceConflict {
                    attendance_id: record.id,
                    leave_request_id: leave.id,
                    date: record.date,
                });
            }
            continue;
        }

        if let Some(day) = time_accounting::day_totals(record) {
            totals.low_seconds += day.classification.low_seconds();
            totals.extra_seconds += day.classification.extra_seconds();
        }
    }

    totals
}

/// Reconciles one employee's balances for `input.period` as of `today`.
pub fn reconcile(input: &ReconcileInput<'_>, today: NaiveDate) -> EmployeeBalance {
    let paid_leave = paid_leave_balance(
        input.paid_leave_allocation,
        input.user_id,
        input.leaves,
        input.calendar,
        Some(input.period.end),
    );
    let taken =
        extra_time_leave_hours_taken(input.user_id, input.leaves, input.calendar, input.period);
    let worked = worked_time_totals(input.user_id, input.attendance, input.leaves, input.period);

    let carried_in = match input.prior {
        Some(prior) if prior.user_id == input.user_id => prior.carried_low_time_seconds(),
        Some(prior) => {
            tracing::warn!(
                user_id = %input.user_id,
                snapshot_user_id = %prior.user_id,
                "ignoring prior snapshot of another employee"
            );
            0
        }
        None => 0,
    };

    let total_low = worked.low_seconds + carried_in;
    let total_extra = worked.extra_seconds;
    let net_seconds = total_extra - total_low;
    let extra_time_worked_hours = net_seconds as f64 / 3600.0;
    let remaining = (taken.hours - extra_time_worked_hours.max(0.0)).max(0.0);

    let is_month_end = is_last_day_of_month(today);
    let (carryover_extra_time_leave_seconds, carryover_low_time_seconds) = if is_month_end {
        let leave_debt = if remaining > 0.0 {
            (remaining * 3600.0).round() as i64
        } else {
            0
        };
        (leave_debt, (-net_seconds).max(0))
    } else {
        (0, 0)
    };

    EmployeeBalance {
        user_id: input.user_id,
        period: input.period,
        paid_leave,
        extra_time_leave_hours_taken: taken.hours,
        extra_time_hours_estimated: taken.estimated,
        total_low_time_seconds: total_low,
        total_extra_time_seconds: total_extra,
        extra_time_worked_hours,
        remaining_extra_time_leave_hours: remaining,
        is_month_end,
        carryover_extra_time_leave_seconds,
        carryover_low_time_seconds,
        conflicts: worked.conflicts,
    }
}

/// Checks a leave submission and returns the new pending request.
///
/// Paid leave is checked against everything already approved from
/// `existing`, whatever month it falls in. Nothing is created when any check
/// fails.
pub fn submit_leave_request(
    user_id: UserId,
    payload: CreateLeaveRequest,
    paid_leave_allocation: Option<u32>,
    existing: &[LeaveRequest],
    calendar: &HolidayCalendar,
    now: DateTime<Utc>,
) -> Result<LeaveRequest> {
    payload.validate()?;
    let paid = paid_leave_balance(paid_leave_allocation, user_id, existing, calendar, None);

    if payload.end_date < payload.start_date {
        return Err(EngineError::InvalidRange(format!(
            "leave ends {} before it starts {}",
            payload.end_date, payload.start_date
        )));
    }
    for time in [&payload.start_time, &payload.end_time].into_iter().flatten() {
        rules::validate_hhmm(time)
            .map_err(|_| EngineError::InvalidRange(format!("invalid time of day: {}", time)))?;
    }

    match payload.category {
        LeaveCategory::HalfDay => {
            if payload.start_date != payload.end_date {
                return Err(EngineError::InvalidRange(
                    "half-day leave must start and end on the same day".into(),
                ));
            }
            let charge = payload
                .half_day_charge
                .or_else(|| HalfDayChargeType::from_legacy_reason(&payload.reason));
            if charge == Some(HalfDayChargeType::Paid) && paid.available_days < HALF_DAY {
                return Err(EngineError::InsufficientBalance {
                    requested: HALF_DAY,
                    available: paid.available_days,
                });
            }
        }
        LeaveCategory::ExtraTime => {
            if payload.start_time.is_none() {
                return Err(EngineError::MissingRequiredField("start_time"));
            }
            if payload.end_time.is_none() {
                return Err(EngineError::MissingRequiredField("end_time"));
            }
        }
        LeaveCategory::Paid => {
            let requested = leave_days::chargeable_days(
                payload.start_date,
                payload.end_date,
                calendar,
                LeaveCategory::Paid,
            );
            if paid.used_days + requested > paid.allocation as f64 {
                return Err(EngineError::InsufficientBalance {
                    requested,
                    available: paid.available_days,
                });
            }
        }
        LeaveCategory::Unpaid | LeaveCategory::Sick | LeaveCategory::Casual => {}
    }

    let request = LeaveRequest::new(user_id, payload, now);
    tracing::debug!(leave_request_id = %request.id, category = ?request.category, "leave request submitted");
    Ok(request)
}
