//! Configuration loading and management for the bookkeeping engine.
//!
//! This module provides functionality to load the engine configuration from
//! YAML files: deployment metadata, payroll policy and deduction rules.
//!
//! # Example
//!
//! ```no_run
//! use bookkeeping_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded configuration: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_OVERTIME_MULTIPLIER, DEFAULT_WEEKLY_OVERTIME_THRESHOLD_HOURS, DeductionRuleConfig,
    DeductionsConfig, EngineConfig, EngineMetadata, PayrollConfig,
};
