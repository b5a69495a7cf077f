//! Time entry model.
//!
//! This module defines the TimeEntry struct for representing a single
//! clock-in/clock-out pair recorded for an employee on one day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents one block of worked time on a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee who worked the time.
    pub employee_id: String,
    /// The day the time was worked.
    pub date: NaiveDate,
    /// Clock-in time.
    pub start_time: NaiveTime,
    /// Clock-out time (same day, after `start_time`).
    pub end_time: NaiveTime,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeEntry {
    /// Returns the clock-in instant.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// Returns the clock-out instant.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// Returns the worked duration in minutes.
    ///
    /// Exact for valid entries, which are recorded to the minute. Zero or
    /// negative for entries that fail [`TimeEntry::validate`].
    pub fn worked_minutes(&self) -> i64 {
        (self.ends_at() - self.starts_at()).num_minutes()
    }

    /// Calculates the worked hours for the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookkeeping_engine::models::TimeEntry;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let entry = TimeEntry {
    ///     id: "te_001".to_string(),
    ///     employee_id: "emp_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
    ///     notes: None,
    /// };
    /// assert_eq!(entry.worked_hours(), Decimal::new(85, 1)); // 8.5 hours
    /// ```
    pub fn worked_hours(&self) -> Decimal {
        Decimal::new(self.worked_minutes(), 0) / Decimal::new(60, 0)
    }

    /// Returns true if the two entries share any instant.
    ///
    /// Touching entries (one ends exactly when the next starts) do not overlap.
    pub fn overlaps(&self, other: &TimeEntry) -> bool {
        self.starts_at() < other.ends_at() && other.starts_at() < self.ends_at()
    }

    /// Checks that the entry has an id, is recorded to the whole minute,
    /// and ends after it starts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidTimeEntry {
                entry_id: self.id.clone(),
                message: "id must not be empty".to_string(),
            });
        }
        for (label, time) in [("start", self.start_time), ("end", self.end_time)] {
            if time.second() != 0 || time.nanosecond() != 0 {
                return Err(EngineError::InvalidTimeEntry {
                    entry_id: self.id.clone(),
                    message: format!("{} time {} must be a whole minute", label, time),
                });
            }
        }
        if self.end_time <= self.start_time {
            return Err(EngineError::InvalidTimeEntry {
                entry_id: self.id.clone(),
                message: format!(
                    "end time {} must be after start time {}",
                    self.end_time, self.start_time
                ),
            });
        }
        Ok(())
    }
}
