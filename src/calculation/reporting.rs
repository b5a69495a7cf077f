//! Report aggregation functionality.
//!
//! This module rolls payroll records, invoices and expenses up into a
//! [`FinancialSummary`] over a date range. Aggregation is pure: the same
//! inputs always serialize to the same JSON.
//!
//! ## Attribution Rules
//!
//! - Revenue counts **paid** invoices by issue date.
//! - Expenses count by expense date.
//! - Payroll counts records by the start of their pay period.
//! - Outstanding amounts cover every sent or overdue invoice, in range or not.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DateRange, EmployeePayrollTotals, ExpenseRecord, FinancialSummary, Invoice, InvoiceStatus,
    MonthlyTotals, PayrollRecord, StatusTotals,
};

/// Percentage change from `previous` to `current`, rounded to 2 places.
///
/// Returns zero when there is nothing to compare against.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::growth_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(growth_percentage(Decimal::from(500), Decimal::ZERO), Decimal::ZERO);
/// assert_eq!(growth_percentage(Decimal::from(150), Decimal::from(100)), Decimal::from(50));
/// assert_eq!(growth_percentage(Decimal::from(50), Decimal::from(100)), Decimal::from(-50));
/// ```
pub fn growth_percentage(current: Decimal, previous: Decimal) -> Decimal {
    percentage(current - previous, previous)
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>, what: &str) -> EngineResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} overflows", what),
        })
}

fn add_into(target: &mut Decimal, value: Decimal, what: &str) -> EngineResult<()> {
    *target = target
        .checked_add(value)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} overflows", what),
        })?;
    Ok(())
}

fn revenue_in(range: &DateRange, invoices: &[Invoice]) -> EngineResult<Decimal> {
    checked_sum(
        invoices
            .iter()
            .filter(|i| i.status() == InvoiceStatus::Paid && range.contains(i.issue_date()))
            .map(|i| i.total_amount()),
        "revenue",
    )
}

fn expenses_in(range: &DateRange, expenses: &[ExpenseRecord]) -> EngineResult<Decimal> {
    checked_sum(
        expenses
            .iter()
            .filter(|e| range.contains(e.date))
            .map(|e| e.amount),
        "expenses",
    )
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Creates an empty entry for every calendar month the range touches.
fn empty_months(range: &DateRange) -> BTreeMap<(i32, u32), MonthlyTotals> {
    let mut months = BTreeMap::new();
    let (mut year, mut month) = month_key(range.start_date);
    let last = month_key(range.end_date);
    while (year, month) <= last {
        months.insert(
            (year, month),
            MonthlyTotals {
                month: format!("{:04}-{:02}", year, month),
                revenue: Decimal::ZERO,
                expenses: Decimal::ZERO,
                payroll: Decimal::ZERO,
                profit: Decimal::ZERO,
            },
        );
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Builds the financial summary for `range`.
///
/// Growth figures compare against [`DateRange::preceding`], the equal-length
/// range ending the day before `range` starts.
///
/// # Errors
///
/// - `InvalidDateRange` if the range ends before it starts, is too long,
///   or has no representable preceding range
/// - `CalculationError` if a sum overflows
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::summarize;
/// use bookkeeping_engine::models::{DateRange, ExpenseCategory, ExpenseRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
/// )
/// .unwrap();
/// let expenses = vec![ExpenseRecord {
///     id: "exp_1".to_string(),
///     category: ExpenseCategory::Rent,
///     amount: Decimal::from(500),
///     date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
///     description: "February rent".to_string(),
///     vendor: None,
/// }];
///
/// let summary = summarize(&range, &[], &[], &expenses).unwrap();
/// assert_eq!(summary.total_expenses, Decimal::from(500));
/// assert_eq!(summary.expense_growth, Decimal::ZERO); // nothing the month before
/// ```
pub fn summarize(
    range: &DateRange,
    payroll_records: &[PayrollRecord],
    invoices: &[Invoice],
    expenses: &[ExpenseRecord],
) -> EngineResult<FinancialSummary> {
    let range = DateRange::new(range.start_date, range.end_date)?;
    let prior_range = range.preceding()?;

    let total_revenue = revenue_in(&range, invoices)?;
    let total_expenses = expenses_in(&range, expenses)?;
    let prior_revenue = revenue_in(&prior_range, invoices)?;
    let prior_expenses = expenses_in(&prior_range, expenses)?;
    let net_profit = total_revenue - total_expenses;

    let mut months = empty_months(&range);

    let mut expenses_by_category = BTreeMap::new();
    for expense in expenses.iter().filter(|e| range.contains(e.date)) {
        add_into(
            expenses_by_category
                .entry(expense.category)
                .or_insert(Decimal::ZERO),
            expense.amount,
            "category total",
        )?;
        if let Some(month) = months.get_mut(&month_key(expense.date)) {
            add_into(&mut month.expenses, expense.amount, "monthly expenses")?;
        }
    }

    let mut invoices_by_status: BTreeMap<InvoiceStatus, StatusTotals> = BTreeMap::new();
    for invoice in invoices.iter().filter(|i| range.contains(i.issue_date())) {
        let totals = invoices_by_status.entry(invoice.status()).or_default();
        totals.count += 1;
        add_into(
            &mut totals.total_amount,
            invoice.total_amount(),
            "status total",
        )?;
        if invoice.status() == InvoiceStatus::Paid {
            if let Some(month) = months.get_mut(&month_key(invoice.issue_date())) {
                add_into(&mut month.revenue, invoice.total_amount(), "monthly revenue")?;
            }
        }
    }

    let outstanding: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| i.status().is_outstanding())
        .collect();
    let outstanding_amount = checked_sum(
        outstanding.iter().map(|i| i.total_amount()),
        "outstanding amount",
    )?;

    let mut payroll_expenses = Decimal::ZERO;
    let mut payroll_by_employee: BTreeMap<String, EmployeePayrollTotals> = BTreeMap::new();
    for record in payroll_records
        .iter()
        .filter(|r| range.contains(r.pay_period.start_date))
    {
        add_into(&mut payroll_expenses, record.gross_pay, "payroll expenses")?;
        let totals = payroll_by_employee
            .entry(record.employee_id.clone())
            .or_default();
        totals.record_count += 1;
        add_into(&mut totals.gross_pay, record.gross_pay, "employee gross pay")?;
        add_into(
            &mut totals.total_deductions,
            record.total_deductions,
            "employee deductions",
        )?;
        add_into(&mut totals.net_pay, record.net_pay, "employee net pay")?;
        if let Some(month) = months.get_mut(&month_key(record.pay_period.start_date)) {
            add_into(&mut month.payroll, record.gross_pay, "monthly payroll")?;
        }
    }

    let monthly = months
        .into_values()
        .map(|mut month| {
            month.profit = month.revenue - month.expenses;
            month
        })
        .collect();

    Ok(FinancialSummary {
        range,
        prior_range,
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin: percentage(net_profit, total_revenue),
        revenue_growth: growth_percentage(total_revenue, prior_revenue),
        expense_growth: growth_percentage(total_expenses, prior_expenses),
        expenses_by_category,
        payroll_expenses,
        payroll_by_employee,
        outstanding_amount,
        outstanding_count: outstanding.len(),
        invoices_by_status,
        monthly,
    })
}
