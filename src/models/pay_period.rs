//! Pay period and pay frequency models.
//!
//! This module contains the [`PayPeriod`] type defining the date window a
//! payroll record covers, and [`PayFrequency`] which fixes how many periods
//! make up a year for salaried pay.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Longest pay period accepted, in days.
pub const MAX_PAY_PERIOD_DAYS: i64 = 366;

/// How often payroll is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Every week (52 periods per year).
    Weekly,
    /// Every two weeks (26 periods per year).
    Biweekly,
    /// Every calendar month (12 periods per year).
    Monthly,
}

impl PayFrequency {
    /// Returns the number of pay periods in a year.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::PayFrequency;
    ///
    /// assert_eq!(PayFrequency::Weekly.periods_per_year(), 52);
    /// assert_eq!(PayFrequency::Biweekly.periods_per_year(), 26);
    /// assert_eq!(PayFrequency::Monthly.periods_per_year(), 12);
    /// ```
    pub fn periods_per_year(self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Monthly => 12,
        }
    }
}

/// A calendar week clipped to the bounds of a pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSpan {
    /// The Monday that starts the calendar week (may precede the period).
    pub week_start: NaiveDate,
    /// First day of the week inside the period.
    pub start_date: NaiveDate,
    /// Last day of the week inside the period.
    pub end_date: NaiveDate,
}

impl WeekSpan {
    /// Checks if a given date falls within this span (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Represents a pay period with its inclusive date range.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let pay_period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
/// };
///
/// assert!(pay_period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()));
/// assert_eq!(pay_period.weeks().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a validated pay period.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        let period = Self {
            start_date,
            end_date,
        };
        period.validate()?;
        Ok(period)
    }

    /// Fails if the period ends before it starts or spans more than
    /// [`MAX_PAY_PERIOD_DAYS`].
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date < self.start_date {
            return Err(self.invalid("end date must not be before start date"));
        }
        if self.length_in_days() > MAX_PAY_PERIOD_DAYS {
            return Err(self.invalid(&format!(
                "period must not span more than {} days",
                MAX_PAY_PERIOD_DAYS
            )));
        }
        Ok(())
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidPayPeriod {
            start_date: self.start_date,
            end_date: self.end_date,
            message: message.to_string(),
        }
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::PayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod {
    ///     start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
    /// };
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())); // start date
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 18).unwrap())); // end date
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 4).unwrap())); // before
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 19).unwrap())); // after
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if the two periods share at least one day.
    pub fn overlaps(&self, other: &PayPeriod) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Returns the number of days in the period.
    pub fn length_in_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Decomposes the period into Monday-to-Sunday calendar weeks.
    ///
    /// Weeks at either edge are clipped to the period, so a period starting
    /// on a Wednesday yields a first span of Wednesday to Sunday. Fails when
    /// the period is invalid or its first Monday falls outside the calendar.
    pub fn weeks(&self) -> EngineResult<Vec<WeekSpan>> {
        self.validate()?;

        let mut week_start = week_start_of(self.start_date)
            .ok_or_else(|| self.invalid("period starts in a week outside the supported calendar"))?;
        let mut spans = Vec::new();
        loop {
            // The clipped end is the period end whenever Sunday is out of range
            let week_end = week_start
                .checked_add_days(Days::new(6))
                .map_or(self.end_date, |sunday| sunday.min(self.end_date));
            spans.push(WeekSpan {
                week_start,
                start_date: week_start.max(self.start_date),
                end_date: week_end,
            });
            match week_start.checked_add_days(Days::new(7)) {
                Some(next) if next <= self.end_date => week_start = next,
                _ => break,
            }
        }
        Ok(spans)
    }
}

/// Returns the Monday on or before `date`, or `None` when that Monday
/// precedes the earliest supported date.
pub fn week_start_of(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}
