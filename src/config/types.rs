//! Configuration types for the bookkeeping engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PayFrequency;

/// Default weekly overtime threshold in hours.
pub const DEFAULT_WEEKLY_OVERTIME_THRESHOLD_HOURS: u32 = 40;

/// Default overtime multiplier (time and a half).
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Metadata about the engine deployment from `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetadata {
    /// Name of the business or deployment.
    pub name: String,
    /// Version of the configuration set.
    pub version: String,
    /// ISO 4217 currency code all amounts are expressed in.
    pub currency: String,
}

impl Default for EngineMetadata {
    fn default() -> Self {
        Self {
            name: "bookkeeping-engine".to_string(),
            version: "default".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// Payroll policy from `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// How often payroll is run; fixes the salaried divisor.
    pub pay_frequency: PayFrequency,
    /// Hours per calendar week before overtime applies.
    #[serde(default = "default_threshold")]
    pub weekly_overtime_threshold_hours: u32,
    /// Multiplier applied to the hourly rate for overtime hours.
    #[serde(default = "default_multiplier")]
    pub overtime_multiplier: Decimal,
}

fn default_threshold() -> u32 {
    DEFAULT_WEEKLY_OVERTIME_THRESHOLD_HOURS
}

fn default_multiplier() -> Decimal {
    DEFAULT_OVERTIME_MULTIPLIER
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            pay_frequency: PayFrequency::Biweekly,
            weekly_overtime_threshold_hours: DEFAULT_WEEKLY_OVERTIME_THRESHOLD_HOURS,
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
        }
    }
}

impl PayrollConfig {
    /// Returns the weekly overtime threshold in minutes.
    pub fn weekly_threshold_minutes(&self) -> i64 {
        i64::from(self.weekly_overtime_threshold_hours) * 60
    }
}

/// One configured deduction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeductionRuleConfig {
    /// Withholds a fraction of gross pay (e.g., `0.062`).
    Percentage {
        /// Rule name shown on the payroll record.
        name: String,
        /// Fraction of gross pay, between 0 and 1.
        rate: Decimal,
    },
    /// Withholds a fixed amount per pay period, capped at gross pay.
    Fixed {
        /// Rule name shown on the payroll record.
        name: String,
        /// Amount per pay period.
        amount: Decimal,
    },
}

impl DeductionRuleConfig {
    /// Returns the rule name.
    pub fn name(&self) -> &str {
        match self {
            DeductionRuleConfig::Percentage { name, .. } | DeductionRuleConfig::Fixed { name, .. } => {
                name
            }
        }
    }
}

/// Deductions configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DeductionsConfig {
    /// Rules in the order they are applied.
    pub deductions: Vec<DeductionRuleConfig>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    payroll: PayrollConfig,
    deductions: Vec<DeductionRuleConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        metadata: EngineMetadata,
        payroll: PayrollConfig,
        deductions: Vec<DeductionRuleConfig>,
    ) -> Self {
        Self {
            metadata,
            payroll,
            deductions,
        }
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the payroll policy.
    pub fn payroll(&self) -> &PayrollConfig {
        &self.payroll
    }

    /// Returns the deduction rules in application order.
    pub fn deductions(&self) -> &[DeductionRuleConfig] {
        &self.deductions
    }
}

impl Default for EngineConfig {
    /// Biweekly payroll, 40 hour weeks at time and a half, and the standard
    /// federal, state, social security and medicare withholdings.
    fn default() -> Self {
        let percentage = |name: &str, rate: Decimal| DeductionRuleConfig::Percentage {
            name: name.to_string(),
            rate,
        };
        Self {
            metadata: EngineMetadata::default(),
            payroll: PayrollConfig::default(),
            deductions: vec![
                percentage("federal_income_tax", Decimal::new(15, 2)),
                percentage("state_income_tax", Decimal::new(5, 2)),
                percentage("social_security", Decimal::new(62, 3)),
                percentage("medicare", Decimal::new(145, 4)),
            ],
        }
    }
}
