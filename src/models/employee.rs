//! Employee model and related types.
//!
//! This module defines the Employee struct together with its employment
//! status and compensation mode.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Whether an employee may currently accrue payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed; time entries and payroll runs are accepted.
    Active,
    /// No longer accruing pay.
    Inactive,
}

/// How an employee is paid.
///
/// Exactly one mode is active at a time; the enum makes a second one
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Compensation {
    /// Paid per worked hour, with overtime.
    Hourly {
        /// Pay per regular hour.
        rate: Decimal,
    },
    /// Paid a fixed share of an annual salary each pay period.
    Salaried {
        /// Gross pay per year.
        annual_salary: Decimal,
    },
}

impl Compensation {
    /// Returns the wire name of the compensation mode.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Compensation::Hourly { .. } => "hourly",
            Compensation::Salaried { .. } => "salaried",
        }
    }
}

/// Represents a person on the payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Department the employee belongs to.
    #[serde(default)]
    pub department: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the employee can accrue payroll.
    pub status: EmployeeStatus,
    /// How the employee is paid.
    pub compensation: Compensation,
    /// The date the employee started.
    pub hire_date: NaiveDate,
}

impl Employee {
    /// Returns true if the employee may accrue new payroll records.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookkeeping_engine::models::{Compensation, Employee, EmployeeStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Dana Whitfield".to_string(),
    ///     position: Some("Bookkeeper".to_string()),
    ///     department: None,
    ///     email: None,
    ///     status: EmployeeStatus::Active,
    ///     compensation: Compensation::Hourly { rate: Decimal::new(2000, 2) },
    ///     hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    /// };
    /// assert!(employee.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Checks the record invariants: non-empty id and name, positive pay.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("id", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(self.invalid("name", "must not be empty"));
        }
        match &self.compensation {
            Compensation::Hourly { rate } if *rate <= Decimal::ZERO => {
                Err(self.invalid("compensation.rate", "must be greater than zero"))
            }
            Compensation::Salaried { annual_salary } if *annual_salary <= Decimal::ZERO => Err(
                self.invalid("compensation.annual_salary", "must be greater than zero"),
            ),
            _ => Ok(()),
        }
    }

    /// Fails unless the employee is active.
    pub fn ensure_active(&self) -> EngineResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(self.invalid("status", "inactive employees cannot accrue payroll"))
        }
    }

    fn invalid(&self, field: &str, message: &str) -> EngineError {
        EngineError::InvalidEmployee {
            employee_id: self.id.clone(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
