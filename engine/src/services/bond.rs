//! Employment bond chaining and remaining-time projection.
//!
//! End dates use calendar months. The remaining-time display uses 30-day
//! months, so the two do not line up exactly.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{EngineError, Result},
    models::user::{Bond, BondType, Employee},
    utils::time::{add_months, format_date_or_dash},
};

const DISPLAY_MONTH_DAYS: i64 = 30;

/// `(start, end)` of every bond. Bond 0 starts on the joining date, each later
/// bond the day after the previous one ends.
pub fn chain_periods(joining_date: NaiveDate, bonds: &[Bond]) -> Result<Vec<(NaiveDate, NaiveDate)>> {
    let mut periods = Vec::with_capacity(bonds.len());
    let mut start = joining_date;
    for (index, bond) in bonds.iter().enumerate() {
        let end = add_months(start, bond.period_months).ok_or_else(|| {
            EngineError::InvalidRange(format!("bond {} ends outside the calendar", index))
        })?;
        periods.push((start, end));
        start = end.succ_opt().ok_or_else(|| {
            EngineError::InvalidRange(format!("bond {} ends outside the calendar", index))
        })?;
    }
    Ok(periods)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemainingTime {
    pub total_days: i64,
    pub months: i64,
    pub days: i64,
    pub display: String,
}

impl RemainingTime {
    pub fn from_days(total_days: i64) -> Self {
        let total_days = total_days.max(0);
        let months = total_days / DISPLAY_MONTH_DAYS;
        let days = total_days % DISPLAY_MONTH_DAYS;
        let display = match (months, days) {
            (0, d) => plural(d, "day"),
            (m, 0) => plural(m, "month"),
            (m, d) => format!("{}, {}", plural(m, "month"), plural(d, "day")),
        };
        Self {
            total_days,
            months,
            days,
            display,
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BondState {
    Upcoming,
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondStatus {
    pub index: usize,
    pub bond_type: BondType,
    pub period_months: u32,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub state: BondState,
    pub is_active: bool,
    pub is_expired: bool,
    /// Days left counted from today, or the full length for an upcoming bond.
    pub remaining: RemainingTime,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondSchedule {
    pub bonds: Vec<BondStatus>,
    pub current_bond: Option<usize>,
    pub total_remaining: RemainingTime,
    pub current_salary: f64,
    /// End date of the first bond.
    pub first_completion_date: Option<NaiveDate>,
}

impl BondSchedule {
    pub fn current(&self) -> Option<&BondStatus> {
        self.current_bond.and_then(|index| self.bonds.get(index))
    }
}

pub fn bond_schedule(joining_date: NaiveDate, bonds: &[Bond], today: NaiveDate) -> Result<BondSchedule> {
    let periods = chain_periods(joining_date, bonds)?;

    let statuses: Vec<BondStatus> = bonds
        .iter()
        .zip(periods)
        .enumerate()
        .map(|(index, (bond, (start, end)))| {
            let state = if end <= today {
                BondState::Expired
            } else if start <= today {
                BondState::Active
            } else {
                BondState::Upcoming
            };
            let (remaining, display) = match state {
                BondState::Active => {
                    let remaining = RemainingTime::from_days((end - today).num_days());
                    let display = format!("{} remaining", remaining.display);
                    (remaining, display)
                }
                BondState::Expired => (
                    RemainingTime::from_days(0),
                    format!("Expired {} days ago", (today - end).num_days()),
                ),
                BondState::Upcoming => (
                    RemainingTime::from_days((end - start).num_days()),
                    format!("Starts on {}", format_date_or_dash(Some(start))),
                ),
            };
            BondStatus {
                index,
                bond_type: bond.bond_type,
                period_months: bond.period_months,
                salary: bond.salary,
                start_date: start,
                end_date: end,
                state,
                is_active: state == BondState::Active,
                is_expired: state == BondState::Expired,
                remaining,
                display,
            }
        })
        .collect();

    let current_bond = statuses.iter().position(|b| b.is_active);
    let total_days = statuses
        .iter()
        .filter(|b| !b.is_expired)
        .map(|b| (b.end_date - b.start_date.max(today)).num_days())
        .sum();
    let current_salary = current_bond.map(|i| statuses[i].salary).unwrap_or(0.0);
    let first_completion_date = statuses.first().map(|b| b.end_date);

    Ok(BondSchedule {
        bonds: statuses,
        current_bond,
        total_remaining: RemainingTime::from_days(total_days),
        current_salary,
        first_completion_date,
    })
}

pub fn employee_bond_schedule(employee: &Employee, today: NaiveDate) -> Result<BondSchedule> {
    bond_schedule(employee.joining_date, &employee.bonds, today)
}
