//! Break intervals taken within an attendance record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::time::lenient_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Kind of break. A standard break is allowed once per day; extra breaks are
/// unlimited but each one carries a reason.
pub enum BreakType {
    #[default]
    Standard,
    Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single break interval.
pub struct Break {
    /// Timestamp when the break started.
    pub start: NaiveDateTime,
    /// Timestamp when the break ended, if the break is closed.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end: Option<NaiveDateTime>,
    #[serde(rename = "type", default)]
    pub break_type: BreakType,
    /// Free-text reason, required for extra breaks.
    #[serde(default)]
    pub reason: Option<String>,
    /// Duration filled when the break ends. Derived from the timestamps when absent.
    #[serde(default)]
    pub duration_seconds: Option<i64>,
}

impl Break {
    /// Creates a new break that starts at `start`.
    pub fn new(break_type: BreakType, reason: Option<String>, start: NaiveDateTime) -> Self {
        Self {
            start,
            end: None,
            break_type,
            reason,
            duration_seconds: None,
        }
    }

    /// Marks the break as completed and computes its duration.
    pub fn end_break(&mut self, end: NaiveDateTime) {
        self.end = Some(end);
        self.duration_seconds = Some((end - self.start).num_seconds().max(0));
    }

    /// Returns `true` while the break is still open.
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Seconds counted toward completed break totals. Open breaks count zero.
    pub fn completed_seconds(&self) -> i64 {
        match self.end {
            Some(end) => self
                .duration_seconds
                .unwrap_or_else(|| (end - self.start).num_seconds())
                .max(0),
            None => 0,
        }
    }

    /// Seconds elapsed as of `now`, including a break that is still open.
    pub fn elapsed_seconds(&self, now: NaiveDateTime) -> i64 {
        if self.is_active() {
            (now - self.start).num_seconds().max(0)
        } else {
            self.completed_seconds()
        }
    }
}

/// Break as found in stored data, before the start time is known to be usable.
#[derive(Deserialize)]
struct StoredBreak {
    #[serde(default, deserialize_with = "lenient_datetime")]
    start: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    end: Option<NaiveDateTime>,
    #[serde(rename = "type", default)]
    break_type: BreakType,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    duration_seconds: Option<i64>,
}

/// Serde helper for a record's break list: breaks without a usable start are
/// dropped instead of failing the whole record.
pub fn lenient_breaks<'de, D>(deserializer: D) -> Result<Vec<Break>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<StoredBreak>::deserialize(deserializer)?;
    Ok(stored
        .into_iter()
        .filter_map(|b| match b.start {
            Some(start) => Some(Break {
                start,
                end: b.end,
                break_type: b.break_type,
                reason: b.reason,
                duration_seconds: b.duration_seconds,
            }),
            None => {
                tracing::warn!(break_type = ?b.break_type, "dropping break without a start time");
                None
            }
        })
        .collect())
}
