//! Payroll record models.
//!
//! This module contains the [`PayrollRecord`] produced by the payroll
//! calculator, its itemized [`DeductionLine`]s and the [`PayrollStatus`]
//! lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditStep, PayFrequency, PayPeriod};
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Calculated but not yet paid out; may still be recalculated.
    Pending,
    /// Paid out; the record is frozen.
    Paid,
}

/// One deduction taken from gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The configured rule name (e.g., "federal_income_tax").
    pub name: String,
    /// The amount withheld, in currency units rounded to cents.
    pub amount: Decimal,
}

/// The pay owed to one employee for one pay period.
///
/// The hour breakdown is frozen at calculation time and does not follow
/// later edits to the underlying time entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Identifier derived from the employee and period, see [`PayrollRecord::record_id_for`].
    pub id: Uuid,
    /// The employee being paid.
    pub employee_id: String,
    /// The period the pay covers.
    pub pay_period: PayPeriod,
    /// The frequency used for salaried pay.
    pub pay_frequency: PayFrequency,
    /// The compensation mode used ("hourly" or "salaried").
    pub compensation_mode: String,
    /// Time entries counted into this record.
    pub entry_ids: Vec<String>,
    /// Hours paid at the regular rate.
    pub regular_hours: Decimal,
    /// Hours paid at the overtime rate.
    pub overtime_hours: Decimal,
    /// Pay for regular hours (or the salary share).
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Pay before deductions.
    pub gross_pay: Decimal,
    /// Deductions in the order they were applied.
    pub deductions: Vec<DeductionLine>,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Pay after deductions, never negative.
    pub net_pay: Decimal,
    /// Lifecycle state.
    pub status: PayrollStatus,
    /// Every decision made while calculating the record.
    pub audit_trace: Vec<AuditStep>,
}

impl PayrollRecord {
    /// Returns the deterministic record identifier for an employee and period.
    ///
    /// Two runs for the same employee and period always map to the same id,
    /// which is what the payroll store keys its uniqueness check on.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::{PayPeriod, PayrollRecord};
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod {
    ///     start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
    /// };
    /// assert_eq!(
    ///     PayrollRecord::record_id_for("emp_001", &period),
    ///     PayrollRecord::record_id_for("emp_001", &period),
    /// );
    /// assert_ne!(
    ///     PayrollRecord::record_id_for("emp_001", &period),
    ///     PayrollRecord::record_id_for("emp_002", &period),
    /// );
    /// ```
    pub fn record_id_for(employee_id: &str, pay_period: &PayPeriod) -> Uuid {
        let name = format!(
            "payroll:{}:{}:{}",
            employee_id, pay_period.start_date, pay_period.end_date
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    /// Returns true once the record has been paid out.
    pub fn is_paid(&self) -> bool {
        self.status == PayrollStatus::Paid
    }

    /// Moves a pending record to paid.
    pub fn mark_paid(&mut self) -> EngineResult<()> {
        if self.is_paid() {
            return Err(EngineError::PayrollRecordImmutable { record_id: self.id });
        }
        self.status = PayrollStatus::Paid;
        Ok(())
    }
}
