//! Calculation logic for the bookkeeping engine.
//!
//! This module contains the pure calculation functions: aggregating time
//! entries into weekly regular and overtime hours, converting hours or salary
//! into gross pay, applying ordered deduction rules, totaling invoice line
//! items, and rolling records up into financial reports.

mod deductions;
mod invoice_totals;
mod pay_period_aggregation;
mod payroll;
mod reporting;

use rust_decimal::{Decimal, RoundingStrategy};

pub use deductions::{DeductionRule, DeductionSchedule, FixedWithholding, PercentageOfGross};
pub use invoice_totals::{InvoiceTotals, RejectedLineItem, total_line_items};
pub use pay_period_aggregation::{
    AggregatedHours, HOURS_DECIMAL_PLACES, WeeklyHours, aggregate_pay_period, minutes_to_hours,
};
pub use payroll::PayrollCalculator;
pub use reporting::{growth_percentage, summarize};

/// Rounds a currency amount to cents, midpoint away from zero.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("2.505").unwrap()), Decimal::from_str("2.51").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("-2.505").unwrap()), Decimal::from_str("-2.51").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
