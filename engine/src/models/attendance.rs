use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    models::break_record::{lenient_breaks, Break, BreakType},
    services::time_accounting,
    types::{AttendanceId, UserId},
    utils::time::lenient_datetime,
};

/// One attendance record per employee and calendar day.
///
/// `total_worked_seconds` is written on clock-out for display purposes only;
/// balance calculations recompute it from the timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub check_in: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub check_out: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_breaks")]
    pub breaks: Vec<Break>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub total_worked_seconds: Option<i64>,
}

/// Replacement values applied by an administrative correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceCorrection {
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub breaks: Vec<Break>,
    pub note: String,
}

impl AttendanceRecord {
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self {
            id: AttendanceId::new(),
            user_id,
            date,
            check_in: None,
            check_out: None,
            breaks: Vec::new(),
            notes: None,
            total_worked_seconds: None,
        }
    }

    pub fn is_clocked_in(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }

    pub fn is_clocked_out(&self) -> bool {
        self.check_out.is_some()
    }

    pub fn active_break(&self) -> Option<&Break> {
        self.breaks.iter().find(|b| b.is_active())
    }

    pub fn clock_in(&mut self, at: NaiveDateTime) -> Result<()> {
        ensure_not_clocked_in(self)?;
        self.check_in = Some(at);
        tracing::debug!(attendance_id = %self.id, %at, "clocked in");
        Ok(())
    }

    pub fn start_break(
        &mut self,
        break_type: BreakType,
        reason: Option<String>,
        at: NaiveDateTime,
    ) -> Result<()> {
        ensure_clocked_in(self)?;
        if self.active_break().is_some() {
            return Err(EngineError::InvalidState(
                "A break is already in progress".into(),
            ));
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        match break_type {
            BreakType::Extra if reason.is_none() => {
                return Err(EngineError::MissingRequiredField("reason"));
            }
            BreakType::Standard if self.has_standard_break() => {
                return Err(EngineError::StandardBreakAlreadyTaken);
            }
            _ => {}
        }

        self.breaks.push(Break::new(break_type, reason, at));
        tracing::debug!(attendance_id = %self.id, ?break_type, %at, "break started");
        Ok(())
    }

    pub fn end_break(&mut self, at: NaiveDateTime) -> Result<()> {
        let active = self
            .breaks
            .iter_mut()
            .find(|b| b.is_active())
            .ok_or_else(|| EngineError::InvalidState("No break in progress".into()))?;
        active.end_break(at);
        tracing::debug!(attendance_id = %self.id, %at, "break ended");
        Ok(())
    }

    /// Closes the session and stores the authoritative net worked seconds.
    /// A break still open at clock-out ends at the clock-out instant.
    pub fn clock_out(&mut self, at: NaiveDateTime) -> Result<i64> {
        ensure_clock_in_exists(self)?;
        ensure_not_clocked_out(self)?;

        if let Some(active) = self.breaks.iter_mut().find(|b| b.is_active()) {
            active.end_break(at);
        }
        self.check_out = Some(at);
        let net = time_accounting::completed_net_seconds(self).unwrap_or(0);
        self.total_worked_seconds = Some(net);
        tracing::debug!(attendance_id = %self.id, %at, net_seconds = net, "clocked out");
        Ok(net)
    }

    /// Replaces the timestamps after the fact and appends the correction note.
    pub fn correct(&mut self, correction: AttendanceCorrection) -> Result<()> {
        let note = correction.note.trim();
        if note.is_empty() {
            return Err(EngineError::MissingRequiredField("note"));
        }
        if correction.check_out.is_some() && correction.check_in.is_none() {
            return Err(EngineError::InvalidState(
                "Check-out requires a check-in".into(),
            ));
        }
        validate_breaks(&correction.breaks)?;

        self.check_in = correction.check_in;
        self.check_out = correction.check_out;
        self.breaks = correction.breaks;
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, note),
            _ => note.to_string(),
        });
        self.total_worked_seconds = time_accounting::completed_net_seconds(self);
        tracing::debug!(attendance_id = %self.id, "attendance corrected");
        Ok(())
    }

    fn has_standard_break(&self) -> bool {
        self.breaks
            .iter()
            .any(|b| b.break_type == BreakType::Standard)
    }
}

fn validate_breaks(breaks: &[Break]) -> Result<()> {
    if breaks.iter().filter(|b| b.is_active()).count() > 1 {
        return Err(EngineError::InvalidState(
            "At most one break may be open".into(),
        ));
    }
    if breaks
        .iter()
        .filter(|b| b.break_type == BreakType::Standard)
        .count()
        > 1
    {
        return Err(EngineError::StandardBreakAlreadyTaken);
    }
    let missing_reason = breaks.iter().any(|b| {
        b.break_type == BreakType::Extra
            && b.reason.as_deref().map_or(true, |r| r.trim().is_empty())
    });
    if missing_reason {
        return Err(EngineError::MissingRequiredField("reason"));
    }
    Ok(())
}

fn ensure_not_clocked_in(record: &AttendanceRecord) -> Result<()> {
    if record.check_in.is_some() {
        Err(EngineError::InvalidState("Already clocked in today".into()))
    } else {
        Ok(())
    }
}

fn ensure_not_clocked_out(record: &AttendanceRecord) -> Result<()> {
    if record.is_clocked_out() {
        Err(EngineError::InvalidState("Already clocked out today".into()))
    } else {
        Ok(())
    }
}

fn ensure_clock_in_exists(record: &AttendanceRecord) -> Result<()> {
    if record.check_in.is_none() {
        Err(EngineError::InvalidState(
            "Must clock in before clocking out".into(),
        ))
    } else {
        Ok(())
    }
}

fn ensure_clocked_in(record: &AttendanceRecord) -> Result<()> {
    if record.is_clocked_in() {
        Ok(())
    } else {
        Err(EngineError::InvalidState(
            "Must be clocked in to start break".into(),
        ))
    }
}
