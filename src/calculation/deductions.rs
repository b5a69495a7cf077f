//! Deduction rules applied to gross pay.
//!
//! Deductions are trait objects evaluated in the order they were configured.
//! Each rule computes an amount from gross pay; the amount is rounded to
//! cents before it is recorded.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::DeductionRuleConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::DeductionLine;

use super::round_currency;

/// A rule that withholds part of an employee's gross pay.
pub trait DeductionRule: Send + Sync + fmt::Debug {
    /// Name recorded on the payroll record.
    fn name(&self) -> &str;

    /// Returns the unrounded amount to withhold from `gross_pay`.
    ///
    /// Fails with `CalculationError` when the amount is not representable.
    fn apply(&self, gross_pay: Decimal) -> EngineResult<Decimal>;

    /// Human-readable description for the audit trace.
    fn describe(&self) -> String;
}

/// Withholds a fixed fraction of gross pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageOfGross {
    name: String,
    rate: Decimal,
}

impl PercentageOfGross {
    /// Creates a rule withholding `rate` (e.g., `0.062`) of gross pay.
    pub fn new(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

impl DeductionRule for PercentageOfGross {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, gross_pay: Decimal) -> EngineResult<Decimal> {
        gross_pay
            .checked_mul(self.rate)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("deduction '{}' overflows on gross pay {}", self.name, gross_pay),
            })
    }

    fn describe(&self) -> String {
        match self.rate.checked_mul(Decimal::ONE_HUNDRED) {
            Some(percent) => format!("{}% of gross", percent.normalize()),
            None => format!("{} times gross", self.rate.normalize()),
        }
    }
}

/// Withholds a fixed amount per period, never more than gross pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWithholding {
    name: String,
    amount: Decimal,
}

impl FixedWithholding {
    /// Creates a rule withholding `amount` each pay period.
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

impl DeductionRule for FixedWithholding {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, gross_pay: Decimal) -> EngineResult<Decimal> {
        Ok(self.amount.min(gross_pay.max(Decimal::ZERO)))
    }

    fn describe(&self) -> String {
        format!("fixed {} per period", self.amount.normalize())
    }
}

/// An ordered list of deduction rules.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::{DeductionSchedule, FixedWithholding, PercentageOfGross};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let schedule = DeductionSchedule::default()
///     .with_rule(PercentageOfGross::new("medicare", Decimal::from_str("0.0145").unwrap()))
///     .with_rule(FixedWithholding::new("union_dues", Decimal::from(10)));
///
/// let lines = schedule.apply(Decimal::from(1000)).unwrap();
/// assert_eq!(lines[0].amount, Decimal::from_str("14.50").unwrap());
/// assert_eq!(lines[1].amount, Decimal::from(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeductionSchedule {
    rules: Vec<Arc<dyn DeductionRule>>,
}

impl DeductionSchedule {
    /// Builds the schedule from configured rules, keeping their order.
    pub fn from_config(rules: &[DeductionRuleConfig]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| -> Arc<dyn DeductionRule> {
                match rule {
                    DeductionRuleConfig::Percentage { name, rate } => {
                        Arc::new(PercentageOfGross::new(name.clone(), *rate))
                    }
                    DeductionRuleConfig::Fixed { name, amount } => {
                        Arc::new(FixedWithholding::new(name.clone(), *amount))
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Appends a rule to the end of the schedule.
    pub fn with_rule(mut self, rule: impl DeductionRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Returns the rules in application order.
    pub fn rules(&self) -> &[Arc<dyn DeductionRule>] {
        &self.rules
    }

    /// Applies every rule to `gross_pay`, rounding each amount to cents.
    pub fn apply(&self, gross_pay: Decimal) -> EngineResult<Vec<DeductionLine>> {
        self.rules
            .iter()
            .map(|rule| {
                Ok(DeductionLine {
                    name: rule.name().to_string(),
                    amount: round_currency(rule.apply(gross_pay)?),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        let rule = PercentageOfGross::new("social_security", dec("0.062"));
        let schedule = DeductionSchedule::default().with_rule(rule);
        // 950 * 0.062 = 58.9
        assert_eq!(schedule.apply(dec("950.00")).unwrap()[0].amount, dec("58.90"));
        // 123.45 * 0.0145 = 1.790025 -> 1.79
        let medicare = DeductionSchedule::default()
            .with_rule(PercentageOfGross::new("medicare", dec("0.0145")));
        assert_eq!(medicare.apply(dec("123.45")).unwrap()[0].amount, dec("1.79"));
    }

    #[test]
    fn test_fixed_withholding_capped_at_gross() {
        let rule = FixedWithholding::new("health_plan", dec("75.00"));
        assert_eq!(rule.apply(dec("50.00")).unwrap(), dec("50.00"));
        assert_eq!(rule.apply(dec("500.00")).unwrap(), dec("75.00"));
        assert_eq!(rule.apply(Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_from_config_keeps_order() {
        let schedule = DeductionSchedule::from_config(EngineConfig::default().deductions());
        let names: Vec<&str> = schedule.rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "federal_income_tax",
                "state_income_tax",
                "social_security",
                "medicare"
            ]
        );
    }

    #[test]
    fn test_default_withholdings_on_950() {
        let schedule = DeductionSchedule::from_config(EngineConfig::default().deductions());
        let lines = schedule.apply(dec("950.00")).unwrap();
        let amounts: Vec<Decimal> = lines.iter().map(|l| l.amount).collect();
        assert_eq!(
            amounts,
            vec![dec("142.50"), dec("47.50"), dec("58.90"), dec("13.78")]
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            PercentageOfGross::new("medicare", dec("0.0145")).describe(),
            "1.45% of gross"
        );
        assert_eq!(
            FixedWithholding::new("dues", dec("10.00")).describe(),
            "fixed 10 per period"
        );
    }

    #[test]
    fn test_empty_schedule_deducts_nothing() {
        assert!(DeductionSchedule::default().apply(dec("100")).unwrap().is_empty());
    }

    #[test]
    fn test_oversized_rate_is_a_calculation_error() {
        let schedule = DeductionSchedule::default()
            .with_rule(PercentageOfGross::new("runaway", Decimal::MAX));
        match schedule.apply(dec("950.00")) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("runaway"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
        assert_eq!(
            PercentageOfGross::new("runaway", Decimal::MAX).describe(),
            format!("{} times gross", Decimal::MAX)
        );
    }
}
