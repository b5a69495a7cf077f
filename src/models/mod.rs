//! Core data models for the bookkeeping engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod employee;
mod expense;
mod invoice;
mod pay_period;
mod payroll_record;
mod report;
mod time_entry;

pub use audit::AuditStep;
pub use employee::{Compensation, Employee, EmployeeStatus};
pub use expense::{ExpenseCategory, ExpenseRecord};
pub use invoice::{Invoice, InvoiceDetails, InvoiceLineItem, InvoiceStatus, Payment};
pub use pay_period::{MAX_PAY_PERIOD_DAYS, PayFrequency, PayPeriod, WeekSpan, week_start_of};
pub use payroll_record::{DeductionLine, PayrollRecord, PayrollStatus};
pub use report::{
    DateRange, EmployeePayrollTotals, FinancialSummary, MAX_REPORT_RANGE_DAYS, MonthlyTotals,
    RangePreset, StatusTotals,
};
pub use time_entry::TimeEntry;
