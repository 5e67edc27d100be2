use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::{
    error::{EngineError, Result},
    models::holiday::CompanyHoliday,
    utils::time::month_bounds,
};

/// Every Sunday is a day off whether or not a holiday is declared for it.
pub const WEEKLY_DAY_OFF: Weekday = Weekday::Sun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayReason {
    PublicHoliday,
    WeeklyHoliday,
    None,
}

impl HolidayReason {
    pub fn label(&self) -> &'static str {
        match self {
            HolidayReason::PublicHoliday => "public holiday",
            HolidayReason::WeeklyHoliday => "weekly holiday",
            HolidayReason::None => "working day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayDecision {
    pub is_holiday: bool,
    pub reason: HolidayReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayCalendarEntry {
    pub date: NaiveDate,
    pub reason: HolidayReason,
}

/// Company calendar: declared holidays plus the weekly day off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    public_holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(public_holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            public_holidays: public_holidays.into_iter().collect(),
        }
    }

    pub fn from_holidays(holidays: &[CompanyHoliday]) -> Self {
        Self::new(holidays.iter().map(|h| h.date))
    }

    pub fn decision_for(&self, date: NaiveDate) -> HolidayDecision {
        if self.public_holidays.contains(&date) {
            return HolidayDecision {
                is_holiday: true,
                reason: HolidayReason::PublicHoliday,
            };
        }

        if date.weekday() == WEEKLY_DAY_OFF {
            return HolidayDecision {
                is_holiday: true,
                reason: HolidayReason::WeeklyHoliday,
            };
        }

        HolidayDecision {
            is_holiday: false,
            reason: HolidayReason::None,
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.decision_for(date).is_holiday
    }

    pub fn entry_for(&self, date: NaiveDate) -> Option<HolidayCalendarEntry> {
        let decision = self.decision_for(date);
        decision.is_holiday.then_some(HolidayCalendarEntry {
            date,
            reason: decision.reason,
        })
    }

    /// Non-working days of a month in date order.
    pub fn list_month(&self, year: i32, month: u32) -> Result<Vec<HolidayCalendarEntry>> {
        let (start, end) = month_bounds(year, month).ok_or_else(|| {
            EngineError::InvalidRange(format!("invalid year/month: {}/{}", year, month))
        })?;
        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter_map(|d| self.entry_for(d))
            .collect())
    }

    /// Working days in `[start, end]`. An inverted range counts zero.
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if start > end {
            return 0;
        }
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }
}
