//! Employees and the employment bonds chained from their joining date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    services::bond,
    types::UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondType {
    Internship,
    Job,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A contractual employment period.
pub struct Bond {
    #[serde(rename = "type")]
    pub bond_type: BondType,
    pub period_months: u32,
    /// Derived from the chain; rewritten by [`Employee::rechain_bonds`].
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: UserId,
    #[serde(default)]
    pub full_name: String,
    pub joining_date: NaiveDate,
    /// Days of paid leave granted. `None` means nothing was granted.
    #[serde(default)]
    pub paid_leave_allocation: Option<u32>,
    #[serde(default)]
    pub bonds: Vec<Bond>,
}

impl Employee {
    pub fn new(full_name: impl Into<String>, joining_date: NaiveDate) -> Self {
        Self {
            id: UserId::new(),
            full_name: full_name.into(),
            joining_date,
            paid_leave_allocation: None,
            bonds: Vec::new(),
        }
    }

    pub fn allocation_days(&self) -> u32 {
        self.paid_leave_allocation.unwrap_or(0)
    }

    /// Rewrites every bond start date from the joining date.
    pub fn rechain_bonds(&mut self) -> Result<()> {
        let periods = bond::chain_periods(self.joining_date, &self.bonds)?;
        for (bond, (start, _)) in self.bonds.iter_mut().zip(periods) {
            bond.start_date = Some(start);
        }
        Ok(())
    }

    pub fn set_joining_date(&mut self, joining_date: NaiveDate) -> Result<()> {
        bond::chain_periods(joining_date, &self.bonds)?;
        self.joining_date = joining_date;
        self.rechain_bonds()
    }

    pub fn set_bond_period(&mut self, index: usize, period_months: u32) -> Result<()> {
        let mut bonds = self.bonds.clone();
        let target = bonds.get_mut(index).ok_or_else(|| {
            EngineError::InvalidState(format!("No bond at position {}", index))
        })?;
        target.period_months = period_months;
        bond::chain_periods(self.joining_date, &bonds)?;
        self.bonds = bonds;
        self.rechain_bonds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bond(months: u32) -> Bond {
        Bond {
            bond_type: BondType::Job,
            period_months: months,
            start_date: None,
            salary: 1000.0,
        }
    }

    #[test]
    fn rechain_follows_joining_date() {
        let mut employee = Employee::new("Asha", date(2024, 1, 1));
        employee.bonds = vec![bond(6), bond(12)];
        employee.rechain_bonds().unwrap();
        assert_eq!(employee.bonds[0].start_date, Some(date(2024, 1, 1)));
        assert_eq!(employee.bonds[1].start_date, Some(date(2024, 7, 2)));
    }

    #[test]
    fn changing_an_earlier_period_moves_later_bonds() {
        let mut employee = Employee::new("Asha", date(2024, 1, 1));
        employee.bonds = vec![bond(6), bond(12), bond(3)];
        employee.rechain_bonds().unwrap();

        employee.set_bond_period(0, 3).unwrap();
        assert_eq!(employee.bonds[1].start_date, Some(date(2024, 4, 2)));
        assert_eq!(employee.bonds[2].start_date, Some(date(2025, 4, 3)));
    }

    #[test]
    fn changing_joining_date_rechains() {
        let mut employee = Employee::new("Asha", date(2024, 1, 1));
        employee.bonds = vec![bond(1), bond(1)];
        employee.set_joining_date(date(2024, 3, 1)).unwrap();
        assert_eq!(employee.bonds[0].start_date, Some(date(2024, 3, 1)));
        assert_eq!(employee.bonds[1].start_date, Some(date(2024, 4, 2)));
    }

    #[test]
    fn unknown_bond_index_leaves_employee_untouched() {
        let mut employee = Employee::new("Asha", date(2024, 1, 1));
        employee.bonds = vec![bond(6)];
        let before = employee.clone();
        assert!(employee.set_bond_period(3, 1).is_err());
        assert_eq!(employee, before);
    }

    #[test]
    fn missing_allocation_means_zero() {
        let employee: Employee = serde_json::from_value(serde_json::json!({
            "id": UserId::new(),
            "joining_date": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(employee.paid_leave_allocation, None);
        assert_eq!(employee.allocation_days(), 0);
    }
}
