use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::{EngineError, Result},
    types::{LeaveRequestId, UserId},
    validation::rules,
};

/// Marker historically embedded in a half-day reason to charge paid leave.
pub const PAID_LEAVE_MARKER: &str = "[Paid Leave]";
/// Marker historically embedded in a half-day reason to charge extra-time leave.
pub const EXTRA_TIME_LEAVE_MARKER: &str = "[Extra Time Leave]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveCategory {
    Paid,
    Unpaid,
    HalfDay,
    ExtraTime,
    Sick,
    Casual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which balance a half-day leave draws from.
pub enum HalfDayChargeType {
    Paid,
    ExtraTime,
}

impl HalfDayChargeType {
    /// Reads the legacy reason markers of rows written before the explicit field.
    pub fn from_legacy_reason(reason: &str) -> Option<Self> {
        if reason.contains(PAID_LEAVE_MARKER) {
            Some(HalfDayChargeType::Paid)
        } else if reason.contains(EXTRA_TIME_LEAVE_MARKER) {
            Some(HalfDayChargeType::ExtraTime)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub user_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: LeaveCategory,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: RequestStatus,
    /// `HH:mm`, only meaningful for half-day and extra-time leave.
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub half_day_charge: Option<HalfDayChargeType>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_by: Option<UserId>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
/// Payload an employee submits to request leave.
pub struct CreateLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: LeaveCategory,
    #[validate(
        length(max = 500),
        custom(function = "rules::validate_not_blank")
    )]
    pub reason: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub half_day_charge: Option<HalfDayChargeType>,
}

impl LeaveRequest {
    pub fn new(user_id: UserId, payload: CreateLeaveRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: LeaveRequestId::new(),
            user_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            category: payload.category,
            reason: payload.reason,
            status: RequestStatus::Pending,
            start_time: payload.start_time,
            end_time: payload.end_time,
            half_day_charge: payload.half_day_charge,
            created_at: now,
            decided_by: None,
            decided_at: None,
        }
    }

    pub fn approve(&mut self, approved_by: UserId, now: DateTime<Utc>) -> Result<()> {
        self.decide(RequestStatus::Approved, approved_by, now)
    }

    pub fn reject(&mut self, rejected_by: UserId, now: DateTime<Utc>) -> Result<()> {
        self.decide(RequestStatus::Rejected, rejected_by, now)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self.status, RequestStatus::Approved)
    }

    /// Balance charged by a half-day leave. The explicit field wins; older rows
    /// fall back to the reason markers.
    pub fn half_day_charge(&self) -> Option<HalfDayChargeType> {
        if self.category != LeaveCategory::HalfDay {
            return None;
        }
        self.half_day_charge
            .or_else(|| HalfDayChargeType::from_legacy_reason(&self.reason))
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    fn decide(&mut self, status: RequestStatus, by: UserId, now: DateTime<Utc>) -> Result<()> {
        if !self.is_pending() {
            return Err(EngineError::InvalidState(format!(
                "Leave request already {:?}",
                self.status
            )));
        }
        self.status = status;
        self.decided_by = Some(by);
        self.decided_at = Some(now);
        tracing::debug!(leave_request_id = %self.id, ?status, "leave request decided");
        Ok(())
    }
}
