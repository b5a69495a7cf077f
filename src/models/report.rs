//! Report models.
//!
//! This module contains the [`DateRange`] a report covers and the
//! [`FinancialSummary`] produced by the report aggregator. All keyed
//! breakdowns use ordered maps so that serialized output is stable.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExpenseCategory, InvoiceStatus};
use crate::error::{EngineError, EngineResult};

/// Longest report range accepted, in days.
pub const MAX_REPORT_RANGE_DAYS: i64 = 3660;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range.
    pub start_date: NaiveDate,
    /// Last day of the range.
    pub end_date: NaiveDate,
}

/// Trailing windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 90 days.
    Quarter,
    /// The last 365 days.
    Year,
}

impl RangePreset {
    /// Returns how many days the window reaches back.
    pub fn days(self) -> u64 {
        match self {
            RangePreset::Week => 7,
            RangePreset::Month => 30,
            RangePreset::Quarter => 90,
            RangePreset::Year => 365,
        }
    }
}

impl DateRange {
    /// Creates a validated range.
    ///
    /// Fails if the range ends before it starts or spans more than
    /// [`MAX_REPORT_RANGE_DAYS`].
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        let range = Self {
            start_date,
            end_date,
        };
        if end_date < start_date {
            return Err(range.invalid("end date must not be before start date"));
        }
        if range.length_in_days() > MAX_REPORT_RANGE_DAYS {
            return Err(range.invalid(&format!(
                "range must not span more than {} days",
                MAX_REPORT_RANGE_DAYS
            )));
        }
        Ok(range)
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidDateRange {
            start_date: self.start_date,
            end_date: self.end_date,
            message: message.to_string(),
        }
    }

    /// Returns the window ending on `today` and reaching back by the preset.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::{DateRange, RangePreset};
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
    /// let range = DateRange::trailing(RangePreset::Week, today).unwrap();
    /// assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2026, 3, 24).unwrap());
    /// assert_eq!(range.end_date, today);
    /// ```
    pub fn trailing(preset: RangePreset, today: NaiveDate) -> EngineResult<Self> {
        let start_date = today
            .checked_sub_days(Days::new(preset.days()))
            .ok_or_else(|| EngineError::InvalidDateRange {
                start_date: NaiveDate::MIN,
                end_date: today,
                message: "window starts before the supported calendar".to_string(),
            })?;
        Self::new(start_date, today)
    }

    /// Checks if a date falls inside the range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the number of days covered.
    pub fn length_in_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Returns the range of equal length ending the day before this one starts.
    ///
    /// Fails when that range would begin before the earliest supported date.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::DateRange;
    /// use chrono::NaiveDate;
    ///
    /// let january = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
    /// )
    /// .unwrap();
    /// let prior = january.preceding().unwrap();
    /// assert_eq!(prior.start_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    /// assert_eq!(prior.end_date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    /// ```
    pub fn preceding(&self) -> EngineResult<Self> {
        let length = u64::try_from(self.length_in_days()).unwrap_or(u64::MAX);
        self.start_date
            .pred_opt()
            .and_then(|end_date| {
                end_date
                    .checked_sub_days(Days::new(length.saturating_sub(1)))
                    .map(|start_date| Self {
                        start_date,
                        end_date,
                    })
            })
            .ok_or_else(|| self.invalid("preceding range starts before the supported calendar"))
    }
}

/// Count and value of the invoices in one status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    /// Number of invoices.
    pub count: usize,
    /// Sum of their totals.
    pub total_amount: Decimal,
}

/// Payroll totals for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayrollTotals {
    /// Number of payroll records.
    pub record_count: usize,
    /// Sum of gross pay.
    pub gross_pay: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub net_pay: Decimal,
}

/// Revenue, expenses and profit for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Month in `YYYY-MM` form.
    pub month: String,
    /// Paid invoice revenue issued in the month.
    pub revenue: Decimal,
    /// Expenses incurred in the month.
    pub expenses: Decimal,
    /// Gross payroll for periods starting in the month.
    pub payroll: Decimal,
    /// `revenue - expenses`.
    pub profit: Decimal,
}

/// Summary statistics for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// The range reported on.
    pub range: DateRange,
    /// The equal-length range the growth figures compare against.
    pub prior_range: DateRange,
    /// Sum of paid invoices issued in range.
    pub total_revenue: Decimal,
    /// Sum of expenses in range.
    pub total_expenses: Decimal,
    /// `total_revenue - total_expenses`.
    pub net_profit: Decimal,
    /// Net profit as a percentage of revenue, 0 without revenue.
    pub profit_margin: Decimal,
    /// Revenue growth against the prior range, in percent.
    pub revenue_growth: Decimal,
    /// Expense growth against the prior range, in percent.
    pub expense_growth: Decimal,
    /// Expense totals for the categories seen in range.
    pub expenses_by_category: BTreeMap<ExpenseCategory, Decimal>,
    /// Gross pay of payroll records whose period starts in range.
    pub payroll_expenses: Decimal,
    /// Payroll totals per employee for the same records.
    pub payroll_by_employee: BTreeMap<String, EmployeePayrollTotals>,
    /// Sum of all sent and overdue invoices, regardless of range.
    pub outstanding_amount: Decimal,
    /// Number of sent and overdue invoices, regardless of range.
    pub outstanding_count: usize,
    /// Invoices issued in range, grouped by status.
    pub invoices_by_status: BTreeMap<InvoiceStatus, StatusTotals>,
    /// Per-month breakdown of the range, oldest first.
    pub monthly: Vec<MonthlyTotals>,
}
