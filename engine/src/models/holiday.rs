use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::HolidayId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyHoliday {
    #[serde(default)]
    pub id: HolidayId,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl CompanyHoliday {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: HolidayId::new(),
            date,
            description: description.into(),
        }
    }
}
