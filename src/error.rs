//! Error types for the bookkeeping engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while aggregating hours, running
//! payroll, totaling invoices and building reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Broad classification of an [`EngineError`].
///
/// Callers at the API boundary map a kind onto a transport status code;
/// the variant itself carries the detail needed for a precise message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input.
    ValidationError,
    /// The operation collides with existing state (duplicates, overlaps, immutability).
    ConflictError,
    /// A referenced record does not exist.
    NotFoundError,
    /// The engine configuration is missing or malformed.
    ConfigurationError,
    /// A record store could not be accessed.
    StorageError,
}

/// The main error type for the bookkeeping engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use bookkeeping_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::InvalidLineItem {
///     index: 1,
///     message: "description must not be empty".to_string(),
/// };
/// assert_eq!(error.kind(), ErrorKind::ValidationError);
/// assert_eq!(
///     error.to_string(),
///     "Invalid line item at position 1: description must not be empty"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or holds invalid values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An employee record was invalid or cannot be used for the operation.
    #[error("Invalid employee '{employee_id}' field '{field}': {message}")]
    InvalidEmployee {
        /// The ID of the employee.
        employee_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A time entry was invalid or contained inconsistent data.
    #[error("Invalid time entry '{entry_id}': {message}")]
    InvalidTimeEntry {
        /// The ID of the invalid entry.
        entry_id: String,
        /// A description of what made the entry invalid.
        message: String,
    },

    /// Two time entries submitted for aggregation overlap in time.
    #[error("Time entries '{first_id}' and '{second_id}' overlap")]
    OverlappingTimeEntries {
        /// The entry that starts first.
        first_id: String,
        /// The entry that starts inside the first one.
        second_id: String,
    },

    /// A pay period boundary was invalid.
    #[error("Invalid pay period {start_date} to {end_date}: {message}")]
    InvalidPayPeriod {
        /// The first day of the period.
        start_date: NaiveDate,
        /// The last day of the period.
        end_date: NaiveDate,
        /// A description of what made the period invalid.
        message: String,
    },

    /// An invoice line item was rejected.
    #[error("Invalid line item at position {index}: {message}")]
    InvalidLineItem {
        /// Zero-based position of the item in the submitted sequence.
        index: usize,
        /// A description of what made the item invalid.
        message: String,
    },

    /// Every submitted line item was rejected.
    #[error("No valid line items remain out of {submitted} submitted")]
    NoValidLineItems {
        /// How many items were submitted.
        submitted: usize,
        /// One reason per rejected item, prefixed with its position.
        rejections: Vec<String>,
    },

    /// An invoice failed validation as a whole.
    #[error("Invalid invoice '{invoice_id}': {message}")]
    InvalidInvoice {
        /// The invoice identifier (or number for unsaved invoices).
        invoice_id: String,
        /// A description of what made the invoice invalid.
        message: String,
    },

    /// An invoice status change that only moves forward was attempted backwards.
    #[error("Invoice '{invoice_id}' cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// The invoice identifier.
        invoice_id: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// An expense record was invalid.
    #[error("Invalid expense '{expense_id}': {message}")]
    InvalidExpense {
        /// The ID of the expense.
        expense_id: String,
        /// A description of what made the expense invalid.
        message: String,
    },

    /// A report date range was invalid.
    #[error("Invalid report range {start_date} to {end_date}: {message}")]
    InvalidDateRange {
        /// The first day of the range.
        start_date: NaiveDate,
        /// The last day of the range.
        end_date: NaiveDate,
        /// A description of what made the range invalid.
        message: String,
    },

    /// A time entry collides with one already recorded in the ledger.
    #[error("Time entry '{entry_id}' conflicts with recorded entry '{existing_id}'")]
    TimeEntryConflict {
        /// The entry being recorded.
        entry_id: String,
        /// The entry already in the ledger.
        existing_id: String,
    },

    /// Payroll has already been run for this employee and period.
    #[error(
        "Payroll already recorded for employee '{employee_id}' for period {start_date} to {end_date}"
    )]
    DuplicatePayrollRun {
        /// The employee ID.
        employee_id: String,
        /// The first day of the period.
        start_date: NaiveDate,
        /// The last day of the period.
        end_date: NaiveDate,
    },

    /// The requested pay period overlaps one already recorded for the employee.
    #[error(
        "Pay period {start_date} to {end_date} for employee '{employee_id}' overlaps recorded payroll '{existing_id}'"
    )]
    OverlappingPayPeriod {
        /// The employee ID.
        employee_id: String,
        /// The first day of the new period.
        start_date: NaiveDate,
        /// The last day of the new period.
        end_date: NaiveDate,
        /// The payroll record already covering part of the period.
        existing_id: Uuid,
    },

    /// A paid payroll record cannot be modified.
    #[error("Payroll record '{record_id}' is paid and cannot be changed")]
    PayrollRecordImmutable {
        /// The payroll record ID.
        record_id: Uuid,
    },

    /// A record with the same identifier already exists.
    #[error("{entity} '{id}' already exists")]
    DuplicateRecord {
        /// The kind of record (e.g., "employee").
        entity: String,
        /// The duplicated identifier.
        id: String,
    },

    /// A referenced record was not found.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// The kind of record (e.g., "employee", "invoice").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A monetary calculation exceeded the representable range.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// A record store lock was poisoned by a panicking writer.
    #[error("Record store unavailable: {message}")]
    StorageUnavailable {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::ConfigurationError
            }
            EngineError::InvalidEmployee { .. }
            | EngineError::InvalidTimeEntry { .. }
            | EngineError::OverlappingTimeEntries { .. }
            | EngineError::InvalidPayPeriod { .. }
            | EngineError::InvalidLineItem { .. }
            | EngineError::NoValidLineItems { .. }
            | EngineError::InvalidInvoice { .. }
            | EngineError::InvalidStatusTransition { .. }
            | EngineError::InvalidExpense { .. }
            | EngineError::InvalidDateRange { .. }
            | EngineError::CalculationError { .. } => ErrorKind::ValidationError,
            EngineError::TimeEntryConflict { .. }
            | EngineError::DuplicatePayrollRun { .. }
            | EngineError::OverlappingPayPeriod { .. }
            | EngineError::PayrollRecordImmutable { .. }
            | EngineError::DuplicateRecord { .. } => ErrorKind::ConflictError,
            EngineError::NotFound { .. } => ErrorKind::NotFoundError,
            EngineError::StorageUnavailable { .. } => ErrorKind::StorageError,
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
