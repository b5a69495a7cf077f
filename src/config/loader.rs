//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    DeductionRuleConfig, DeductionsConfig, EngineConfig, EngineMetadata, PayrollConfig,
};

/// Loads and provides access to the engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// checks that the values make sense before anything is calculated with them.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml      # Deployment metadata
/// ├── payroll.yaml     # Pay frequency and overtime policy
/// └── deductions.yaml  # Ordered deduction rules
/// ```
///
/// # Example
///
/// ```no_run
/// use bookkeeping_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Pay frequency: {:?}", loader.payroll().pay_frequency);
/// for rule in loader.deductions() {
///     println!("Deduction: {}", rule.name());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or a required field is missing (`ConfigParseError`)
    /// - A value is out of range, such as a multiplier below 1 (`ConfigParseError`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bookkeeping_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), bookkeeping_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let metadata = Self::load_yaml::<EngineMetadata>(&engine_path)?;

        let payroll_path = path.join("payroll.yaml");
        let payroll = Self::load_yaml::<PayrollConfig>(&payroll_path)?;
        Self::validate_payroll(&payroll, &payroll_path)?;

        let deductions_path = path.join("deductions.yaml");
        let deductions = Self::load_yaml::<DeductionsConfig>(&deductions_path)?.deductions;
        Self::validate_deductions(&deductions, &deductions_path)?;

        Ok(Self {
            config: EngineConfig::new(metadata, payroll, deductions),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_payroll(payroll: &PayrollConfig, path: &Path) -> EngineResult<()> {
        if payroll.weekly_overtime_threshold_hours == 0 {
            return Err(Self::invalid(
                path,
                "weekly_overtime_threshold_hours must be greater than zero",
            ));
        }
        if payroll.overtime_multiplier < Decimal::ONE {
            return Err(Self::invalid(
                path,
                format!(
                    "overtime_multiplier must be at least 1, got {}",
                    payroll.overtime_multiplier
                ),
            ));
        }
        Ok(())
    }

    fn validate_deductions(rules: &[DeductionRuleConfig], path: &Path) -> EngineResult<()> {
        let mut seen = HashSet::new();
        for rule in rules {
            if rule.name().trim().is_empty() {
                return Err(Self::invalid(path, "deduction name must not be empty"));
            }
            if !seen.insert(rule.name()) {
                return Err(Self::invalid(
                    path,
                    format!("deduction '{}' is listed more than once", rule.name()),
                ));
            }
            match rule {
                DeductionRuleConfig::Percentage { name, rate } => {
                    if *rate < Decimal::ZERO || *rate > Decimal::ONE {
                        return Err(Self::invalid(
                            path,
                            format!("deduction '{}' rate {} must be between 0 and 1", name, rate),
                        ));
                    }
                }
                DeductionRuleConfig::Fixed { name, amount } => {
                    if *amount < Decimal::ZERO {
                        return Err(Self::invalid(
                            path,
                            format!("deduction '{}' amount must not be negative", name),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn invalid(path: &Path, message: impl Into<String>) -> EngineError {
        EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the deployment metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Returns the payroll policy.
    pub fn payroll(&self) -> &PayrollConfig {
        self.config.payroll()
    }

    /// Returns the deduction rules in application order.
    pub fn deductions(&self) -> &[DeductionRuleConfig] {
        self.config.deductions()
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
