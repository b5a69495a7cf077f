//! Payroll calculation functionality.
//!
//! This module turns aggregated hours (or a fixed salary) into a
//! [`PayrollRecord`]: gross pay, itemized deductions and net pay, each step
//! recorded in the audit trace.
//!
//! ## Pay Structure
//!
//! - **Hourly:** `regular_hours × rate + overtime_hours × rate × multiplier`
//! - **Salaried:** `annual_salary / periods_per_year`
//!
//! Every pay component and every deduction is rounded to cents, midpoint
//! away from zero. Net pay never drops below zero.

use rust_decimal::Decimal;

use crate::config::{EngineConfig, PayrollConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, Compensation, Employee, PayPeriod, PayrollRecord, PayrollStatus, TimeEntry,
};

use super::{AggregatedHours, DeductionSchedule, aggregate_pay_period, round_currency};

/// Computes payroll records from aggregated hours.
///
/// The calculator holds no clock and no mutable state, so the same employee,
/// period and hours always produce the same record.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::PayrollCalculator;
/// use bookkeeping_engine::config::EngineConfig;
/// use bookkeeping_engine::models::{Compensation, Employee, EmployeeStatus, PayPeriod, TimeEntry};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let calculator = PayrollCalculator::from_config(&EngineConfig::default());
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Dana Whitfield".to_string(),
///     position: None,
///     department: None,
///     email: None,
///     status: EmployeeStatus::Active,
///     compensation: Compensation::Hourly { rate: Decimal::from(20) },
///     hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// };
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 11).unwrap(),
/// )
/// .unwrap();
/// let entries: Vec<TimeEntry> = (5..=9)
///     .map(|day| TimeEntry {
///         id: format!("te_{}", day),
///         employee_id: "emp_001".to_string(),
///         date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
///         start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///         end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///         notes: None,
///     })
///     .collect();
///
/// let record = calculator.run(&employee, &period, &entries).unwrap();
/// assert_eq!(record.gross_pay, Decimal::from(950));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollCalculator {
    payroll: PayrollConfig,
    deductions: DeductionSchedule,
}

impl PayrollCalculator {
    /// Creates a calculator with an explicit policy and deduction schedule.
    pub fn new(payroll: PayrollConfig, deductions: DeductionSchedule) -> Self {
        Self {
            payroll,
            deductions,
        }
    }

    /// Creates a calculator from loaded configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.payroll().clone(),
            DeductionSchedule::from_config(config.deductions()),
        )
    }

    /// Returns the payroll policy in use.
    pub fn payroll_config(&self) -> &PayrollConfig {
        &self.payroll
    }

    /// Returns the deduction schedule in use.
    pub fn deductions(&self) -> &DeductionSchedule {
        &self.deductions
    }

    /// Aggregates `entries` over `pay_period` for the employee.
    pub fn aggregate(
        &self,
        employee_id: &str,
        pay_period: &PayPeriod,
        entries: &[TimeEntry],
    ) -> EngineResult<AggregatedHours> {
        aggregate_pay_period(employee_id, pay_period, entries, &self.payroll)
    }

    /// Aggregates the entries and calculates the record in one step.
    pub fn run(
        &self,
        employee: &Employee,
        pay_period: &PayPeriod,
        entries: &[TimeEntry],
    ) -> EngineResult<PayrollRecord> {
        employee.validate()?;
        employee.ensure_active()?;
        let hours = self.aggregate(&employee.id, pay_period, entries)?;
        self.calculate(employee, pay_period, &hours)
    }

    /// Calculates the payroll record for an employee over a pay period.
    ///
    /// # Errors
    ///
    /// - `InvalidEmployee` if the employee is inactive, has non-positive
    ///   compensation, or does not own `hours`
    /// - `InvalidPayPeriod` if `hours` were aggregated over another period
    /// - `CalculationError` if an amount overflows
    pub fn calculate(
        &self,
        employee: &Employee,
        pay_period: &PayPeriod,
        hours: &AggregatedHours,
    ) -> EngineResult<PayrollRecord> {
        employee.validate()?;
        employee.ensure_active()?;
        pay_period.validate()?;

        if hours.employee_id != employee.id {
            return Err(EngineError::InvalidEmployee {
                employee_id: employee.id.clone(),
                field: "id".to_string(),
                message: format!("hours were aggregated for employee '{}'", hours.employee_id),
            });
        }
        if hours.pay_period != *pay_period {
            return Err(EngineError::InvalidPayPeriod {
                start_date: pay_period.start_date,
                end_date: pay_period.end_date,
                message: format!(
                    "hours were aggregated for {} to {}",
                    hours.pay_period.start_date, hours.pay_period.end_date
                ),
            });
        }

        let mut audit_trace = hours.audit_steps.clone();
        let mut step_number = audit_trace.len() as u32 + 1;

        let (regular_pay, overtime_pay) = match &employee.compensation {
            Compensation::Hourly { rate } => {
                let overtime_rate = checked(
                    rate.checked_mul(self.payroll.overtime_multiplier),
                    "overtime rate",
                )?;
                let regular_pay = pay_for_minutes(*rate, hours.regular_minutes, "regular pay")?;
                let overtime_pay =
                    pay_for_minutes(overtime_rate, hours.overtime_minutes, "overtime pay")?;

                audit_trace.push(AuditStep {
                    step_number,
                    rule_id: "hourly_regular_pay".to_string(),
                    rule_name: "Hourly Regular Pay".to_string(),
                    input: serde_json::json!({
                        "regular_hours": hours.regular_hours.normalize().to_string(),
                        "rate": rate.normalize().to_string(),
                    }),
                    output: serde_json::json!({
                        "regular_pay": regular_pay.to_string(),
                    }),
                    reasoning: format!(
                        "{} regular hours × ${} = ${}",
                        hours.regular_hours.normalize(),
                        rate.normalize(),
                        regular_pay
                    ),
                });
                step_number += 1;

                audit_trace.push(AuditStep {
                    step_number,
                    rule_id: "hourly_overtime_pay".to_string(),
                    rule_name: "Hourly Overtime Pay".to_string(),
                    input: serde_json::json!({
                        "overtime_hours": hours.overtime_hours.normalize().to_string(),
                        "rate": rate.normalize().to_string(),
                        "multiplier": self.payroll.overtime_multiplier.normalize().to_string(),
                    }),
                    output: serde_json::json!({
                        "overtime_rate": overtime_rate.normalize().to_string(),
                        "overtime_pay": overtime_pay.to_string(),
                    }),
                    reasoning: format!(
                        "{} overtime hours × ${} × {} = ${}",
                        hours.overtime_hours.normalize(),
                        rate.normalize(),
                        self.payroll.overtime_multiplier.normalize(),
                        overtime_pay
                    ),
                });
                step_number += 1;

                (regular_pay, overtime_pay)
            }
            Compensation::Salaried { annual_salary } => {
                let periods = self.payroll.pay_frequency.periods_per_year();
                let salary_share = checked(
                    annual_salary.checked_div(Decimal::from(periods)),
                    "salary share",
                )?;
                let regular_pay = round_currency(salary_share);

                audit_trace.push(AuditStep {
                    step_number,
                    rule_id: "salaried_period_pay".to_string(),
                    rule_name: "Salaried Period Pay".to_string(),
                    input: serde_json::json!({
                        "annual_salary": annual_salary.normalize().to_string(),
                        "pay_frequency": self.payroll.pay_frequency,
                        "periods_per_year": periods,
                    }),
                    output: serde_json::json!({
                        "regular_pay": regular_pay.to_string(),
                    }),
                    reasoning: format!(
                        "${} annual salary / {} periods = ${}",
                        annual_salary.normalize(),
                        periods,
                        regular_pay
                    ),
                });
                step_number += 1;

                (regular_pay, Decimal::ZERO)
            }
        };

        let gross_pay = checked(regular_pay.checked_add(overtime_pay), "gross pay")?;

        let deductions = self.deductions.apply(gross_pay)?;
        for (line, rule) in deductions.iter().zip(self.deductions.rules()) {
            audit_trace.push(AuditStep {
                step_number,
                rule_id: format!("deduction:{}", line.name),
                rule_name: format!("Deduction {}", line.name),
                input: serde_json::json!({
                    "gross_pay": gross_pay.to_string(),
                    "rule": rule.describe(),
                }),
                output: serde_json::json!({
                    "amount": line.amount.to_string(),
                }),
                reasoning: format!("{} of ${} = ${}", rule.describe(), gross_pay, line.amount),
            });
            step_number += 1;
        }

        let total_deductions = deductions
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount))
            .ok_or_else(|| EngineError::CalculationError {
                message: "total deductions overflowed".to_string(),
            })?;
        let net_pay =
            checked(gross_pay.checked_sub(total_deductions), "net pay")?.max(Decimal::ZERO);

        audit_trace.push(AuditStep {
            step_number,
            rule_id: "net_pay".to_string(),
            rule_name: "Net Pay".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.to_string(),
                "total_deductions": total_deductions.to_string(),
            }),
            output: serde_json::json!({
                "net_pay": net_pay.to_string(),
            }),
            reasoning: if gross_pay < total_deductions {
                format!(
                    "Deductions ${} exceed gross ${}, net pay floored at $0",
                    total_deductions, gross_pay
                )
            } else {
                format!("${} - ${} = ${}", gross_pay, total_deductions, net_pay)
            },
        });

        Ok(PayrollRecord {
            id: PayrollRecord::record_id_for(&employee.id, pay_period),
            employee_id: employee.id.clone(),
            pay_period: *pay_period,
            pay_frequency: self.payroll.pay_frequency,
            compensation_mode: employee.compensation.mode_name().to_string(),
            entry_ids: hours.entry_ids.clone(),
            regular_hours: hours.regular_hours,
            overtime_hours: hours.overtime_hours,
            regular_pay,
            overtime_pay,
            gross_pay,
            deductions,
            total_deductions,
            net_pay,
            status: PayrollStatus::Pending,
            audit_trace,
        })
    }
}

/// Pays `rate` per hour for `minutes`, rounded to cents.
fn pay_for_minutes(rate: Decimal, minutes: i64, what: &str) -> EngineResult<Decimal> {
    let amount = rate
        .checked_mul(Decimal::from(minutes))
        .and_then(|v| v.checked_div(Decimal::from(60)));
    Ok(round_currency(checked(amount, what)?))
}

fn checked(value: Option<Decimal>, what: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::CalculationError {
        message: format!("{} exceeds the representable range", what),
    })
}
