//! Application state for the bookkeeping engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::PayrollCalculator;
use crate::config::{ConfigLoader, EngineConfig};
use crate::storage::{EmployeeStore, ExpenseStore, InvoiceStore, PayrollStore, TimeLedger};

/// Shared application state.
///
/// Contains the loaded configuration, the payroll calculator built from it,
/// and the record stores. Cloning is cheap; clones share the same stores.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
    calculator: Arc<PayrollCalculator>,
    employees: EmployeeStore,
    ledger: TimeLedger,
    payroll: PayrollStore,
    invoices: InvoiceStore,
    expenses: ExpenseStore,
}

impl AppState {
    /// Creates a new application state with empty stores.
    pub fn new(config: ConfigLoader) -> Self {
        Self::from_config(config.into_config())
    }

    /// Creates a new application state from an already loaded configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        let calculator = PayrollCalculator::from_config(&config);
        Self {
            config: Arc::new(config),
            calculator: Arc::new(calculator),
            employees: EmployeeStore::new("employee"),
            ledger: TimeLedger::new(),
            payroll: PayrollStore::new(),
            invoices: InvoiceStore::new("invoice"),
            expenses: ExpenseStore::new("expense"),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the payroll calculator.
    pub fn calculator(&self) -> &PayrollCalculator {
        &self.calculator
    }

    /// Returns the employee store.
    pub fn employees(&self) -> &EmployeeStore {
        &self.employees
    }

    /// Returns the time ledger.
    pub fn ledger(&self) -> &TimeLedger {
        &self.ledger
    }

    /// Returns the payroll record store.
    pub fn payroll(&self) -> &PayrollStore {
        &self.payroll
    }

    /// Returns the invoice store.
    pub fn invoices(&self) -> &InvoiceStore {
        &self.invoices
    }

    /// Returns the expense store.
    pub fn expenses(&self) -> &ExpenseStore {
        &self.expenses
    }
}
