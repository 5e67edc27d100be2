//! Month-end close.
//!
//! Reads the previous month's snapshot as the carryover baseline, reconciles
//! the month and records the outcome in the ledger exactly once. A month that
//! is already closed is left as it is.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::{
    error::Result,
    models::{
        attendance::AttendanceRecord,
        balance::{BalancePeriod, EmployeeBalance, MonthlyBalanceSnapshot},
        leave_request::LeaveRequest,
        user::Employee,
    },
    repositories::BalanceLedgerTrait,
    services::{
        balance::{reconcile, ReconcileInput},
        holiday::HolidayCalendar,
    },
    utils::time::{is_last_day_of_month, previous_month},
};

/// Records of one employee the close reads.
#[derive(Debug, Clone, Copy)]
pub struct PeriodInputs<'a> {
    pub leaves: &'a [LeaveRequest],
    pub attendance: &'a [AttendanceRecord],
    pub calendar: &'a HolidayCalendar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonthEndOutcome {
    /// `today` is not the last day of its month; nothing was written.
    NotMonthEnd,
    /// The month had been closed before; the stored snapshot is returned.
    AlreadyClosed(MonthlyBalanceSnapshot),
    Closed(MonthlyBalanceSnapshot),
}

pub struct MonthEndService<L> {
    ledger: L,
}

impl<L: BalanceLedgerTrait> MonthEndService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Month-to-date balance for `today`, including last month's carryover.
    pub async fn current_balance(
        &self,
        employee: &Employee,
        inputs: PeriodInputs<'_>,
        today: NaiveDate,
    ) -> Result<EmployeeBalance> {
        let period = BalancePeriod::month_of(today);
        let (prev_year, prev_month) = previous_month(today.year(), today.month());
        let prior = self
            .ledger
            .find_snapshot(employee.id, prev_year, prev_month)
            .await?;

        Ok(reconcile(
            &ReconcileInput {
                user_id: employee.id,
                paid_leave_allocation: employee.paid_leave_allocation,
                leaves: inputs.leaves,
                attendance: inputs.attendance,
                calendar: inputs.calendar,
                period,
                prior: prior.as_ref(),
            },
            today,
        ))
    }

    pub async fn close_month(
        &self,
        employee: &Employee,
        inputs: PeriodInputs<'_>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<MonthEndOutcome> {
        if !is_last_day_of_month(today) {
            return Ok(MonthEndOutcome::NotMonthEnd);
        }

        if let Some(existing) = self
            .ledger
            .find_snapshot(employee.id, today.year(), today.month())
            .await?
        {
            tracing::debug!(user_id = %employee.id, year = existing.year, month = existing.month, "month already closed");
            return Ok(MonthEndOutcome::AlreadyClosed(existing));
        }

        let balance = self.current_balance(employee, inputs, today).await?;
        let snapshot = MonthlyBalanceSnapshot::from_balance(&balance, now);
        self.ledger.insert_snapshot(snapshot.clone()).await?;

        tracing::info!(
            user_id = %employee.id,
            year = snapshot.year,
            month = snapshot.month,
            remaining_extra_time_leave_hours = snapshot.remaining_extra_time_leave_hours,
            carryover_low_time_seconds = snapshot.carried_low_time_seconds(),
            conflicts = balance.conflicts.len(),
            "month closed"
        );
        Ok(MonthEndOutcome::Closed(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::EngineError, repositories::MockBalanceLedgerTrait};

    fn employee() -> Employee {
        let mut employee = Employee::new("Ravi", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        employee.paid_leave_allocation = Some(12);
        employee
    }

    fn inputs(calendar: &HolidayCalendar) -> PeriodInputs<'_> {
        PeriodInputs {
            leaves: &[],
            attendance: &[],
            calendar,
        }
    }

    #[tokio::test]
    async fn not_month_end_never_touches_ledger() {
        let ledger = MockBalanceLedgerTrait::new();
        let service = MonthEndService::new(ledger);
        let calendar = HolidayCalendar::default();
        let outcome = service
            .close_month(
                &employee(),
                inputs(&calendar),
                NaiveDate::from_ymd_opt(2024, 6, 29).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, MonthEndOutcome::NotMonthEnd);
    }

    #[tokio::test]
    async fn close_reads_prior_month_and_writes_once() {
        let employee = employee();
        let mut ledger = MockBalanceLedgerTrait::new();
        ledger
            .expect_find_snapshot()
            .withf(|_, year, month| (*year, *month) == (2024, 6))
            .times(1)
            .returning(|_, _, _| Ok(None));
        ledger
            .expect_find_snapshot()
            .withf(|_, year, month| (*year, *month) == (2024, 5))
            .times(1)
            .returning(|_, _, _| Ok(None));
        ledger
            .expect_insert_snapshot()
            .withf(|s| s.year == 2024 && s.month == 6)
            .times(1)
            .returning(|_| Ok(()));

        let service = MonthEndService::new(ledger);
        let calendar = HolidayCalendar::default();
        let outcome = service
            .close_month(
                &employee,
                inputs(&calendar),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, MonthEndOutcome::Closed(s) if s.user_id == employee.id));
    }

    #[tokio::test]
    async fn ledger_failure_propagates() {
        let mut ledger = MockBalanceLedgerTrait::new();
        ledger
            .expect_find_snapshot()
            .returning(|_, _, _| Ok(None));
        ledger
            .expect_insert_snapshot()
            .returning(|_| Err(EngineError::InvalidState("closed concurrently".into())));

        let service = MonthEndService::new(ledger);
        let calendar = HolidayCalendar::default();
        let err = service
            .close_month(
                &employee(),
                inputs(&calendar),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }
}
