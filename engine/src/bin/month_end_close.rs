use std::fs;

use anyhow::Context;
use attendance_engine::{
    config::Config,
    models::{
        attendance::AttendanceRecord, balance::MonthlyBalanceSnapshot, holiday::CompanyHoliday,
        leave_request::LeaveRequest, user::Employee,
    },
    repositories::InMemoryLedger,
    services::{
        holiday::HolidayCalendar,
        month_end::{MonthEndOutcome, MonthEndService, PeriodInputs},
    },
    utils::{rows::skip_malformed_rows, time},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct MonthEndInput {
    #[serde(default)]
    today: Option<NaiveDate>,
    #[serde(default, deserialize_with = "skip_malformed_rows")]
    holidays: Vec<CompanyHoliday>,
    #[serde(deserialize_with = "skip_malformed_rows")]
    employees: Vec<EmployeeRecords>,
    /// Previously closed months, used as carryover baseline.
    #[serde(default, deserialize_with = "skip_malformed_rows")]
    snapshots: Vec<MonthlyBalanceSnapshot>,
}

#[derive(Debug, Deserialize)]
struct EmployeeRecords {
    #[serde(flatten)]
    employee: Employee,
    #[serde(default, deserialize_with = "skip_malformed_rows")]
    attendance: Vec<AttendanceRecord>,
    #[serde(default, deserialize_with = "skip_malformed_rows")]
    leaves: Vec<LeaveRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum OutcomeKind {
    NotMonthEnd,
    AlreadyClosed,
    Closed,
    Failed,
}

#[derive(Debug, Serialize)]
struct CloseReport {
    user_id: String,
    full_name: String,
    outcome: OutcomeKind,
    snapshot: Option<MonthlyBalanceSnapshot>,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_engine=info,month_end_close=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;
    tracing::info!(
        time_zone = %config.time_zone,
        input = %config.month_end_input.display(),
        "Loaded configuration from environment/.env"
    );

    let raw = fs::read_to_string(&config.month_end_input)
        .with_context(|| format!("reading {}", config.month_end_input.display()))?;
    let input: MonthEndInput = serde_json::from_str(&raw).context("parsing month-end input")?;

    let today = input
        .today
        .unwrap_or_else(|| time::today_local(&config.time_zone));
    let calendar = HolidayCalendar::from_holidays(&input.holidays);
    let service = MonthEndService::new(InMemoryLedger::with_snapshots(input.snapshots));

    let mut reports = Vec::with_capacity(input.employees.len());
    for records in &input.employees {
        let employee = &records.employee;
        let inputs = PeriodInputs {
            leaves: &records.leaves,
            attendance: &records.attendance,
            calendar: &calendar,
        };
        let (outcome, snapshot, error) =
            match service.close_month(employee, inputs, today, Utc::now()).await {
                Ok(MonthEndOutcome::NotMonthEnd) => (OutcomeKind::NotMonthEnd, None, None),
                Ok(MonthEndOutcome::AlreadyClosed(s)) => (OutcomeKind::AlreadyClosed, Some(s), None),
                Ok(MonthEndOutcome::Closed(s)) => (OutcomeKind::Closed, Some(s), None),
                Err(err) => {
                    tracing::error!(user_id = %employee.id, error = %err, code = err.code(), "month-end close failed");
                    (OutcomeKind::Failed, None, Some(err.to_string()))
                }
            };
        reports.push(CloseReport {
            user_id: employee.id.to_string(),
            full_name: employee.full_name.clone(),
            outcome,
            snapshot,
            error,
        });
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
