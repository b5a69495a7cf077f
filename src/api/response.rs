//! Response types for the bookkeeping engine API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors onto HTTP status codes, and response views that add derived
//! fields to stored records.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RejectedLineItem;
use crate::error::{EngineError, ErrorKind};
use crate::models::{Invoice, PayPeriod, PayrollRecord};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Broad error classification.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", ErrorKind::ValidationError, message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", ErrorKind::ValidationError, message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// Returns the HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::ConflictError => StatusCode::CONFLICT,
        ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
        ErrorKind::ConfigurationError | ErrorKind::StorageError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
            "CONFIG_ERROR"
        }
        EngineError::InvalidEmployee { .. } => "INVALID_EMPLOYEE",
        EngineError::InvalidTimeEntry { .. } => "INVALID_TIME_ENTRY",
        EngineError::OverlappingTimeEntries { .. } => "OVERLAPPING_TIME_ENTRIES",
        EngineError::InvalidPayPeriod { .. } => "INVALID_PAY_PERIOD",
        EngineError::InvalidLineItem { .. } => "INVALID_LINE_ITEM",
        EngineError::NoValidLineItems { .. } => "NO_VALID_LINE_ITEMS",
        EngineError::InvalidInvoice { .. } => "INVALID_INVOICE",
        EngineError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
        EngineError::InvalidExpense { .. } => "INVALID_EXPENSE",
        EngineError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        EngineError::TimeEntryConflict { .. } => "TIME_ENTRY_CONFLICT",
        EngineError::DuplicatePayrollRun { .. } => "DUPLICATE_PAYROLL_RUN",
        EngineError::OverlappingPayPeriod { .. } => "OVERLAPPING_PAY_PERIOD",
        EngineError::PayrollRecordImmutable { .. } => "PAYROLL_RECORD_IMMUTABLE",
        EngineError::DuplicateRecord { .. } => "DUPLICATE_RECORD",
        EngineError::NotFound { .. } => "NOT_FOUND",
        EngineError::CalculationError { .. } => "CALCULATION_ERROR",
        EngineError::StorageUnavailable { .. } => "STORAGE_ERROR",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let kind = error.kind();
        let mut api_error = ApiError::new(error_code(&error), kind, error.to_string());

        match &error {
            EngineError::NoValidLineItems { rejections, .. } => {
                api_error = api_error.with_details(rejections.join("; "));
            }
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::StorageUnavailable { .. } => {
                // Internal detail stays in the logs.
                api_error = ApiError::new(error_code(&error), kind, "Internal server error")
                    .with_details(kind_description(kind));
            }
            _ => {}
        }

        ApiErrorResponse {
            status: status_for(kind),
            error: api_error,
        }
    }
}

fn kind_description(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ConfigurationError => "The engine configuration is unavailable",
        ErrorKind::StorageError => "The record store is unavailable",
        _ => "",
    }
}

/// An invoice with its derived payment figures.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    /// The stored invoice.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// Sum of payments received.
    pub amount_paid: Decimal,
    /// What the client still owes.
    pub balance_due: Decimal,
    /// Items discarded while creating the invoice.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_items: Vec<RejectedLineItem>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            amount_paid: invoice.amount_paid(),
            balance_due: invoice.balance_due(),
            invoice,
            rejected_items: Vec::new(),
        }
    }
}

/// An employee a batch payroll run could not pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollBatchFailure {
    /// The employee left unpaid.
    pub employee_id: String,
    /// Why the run failed for this employee.
    pub error: ApiError,
}

/// Outcome of `POST /payroll/process`.
#[derive(Debug, Clone, Serialize)]
pub struct PayrollBatchResponse {
    /// The period processed.
    pub pay_period: PayPeriod,
    /// Records stored by this run, ordered by employee id.
    pub created: Vec<PayrollRecord>,
    /// Active hourly employees with no time recorded in the period.
    pub without_hours: Vec<String>,
    /// Employees whose run failed, such as those already paid for the period.
    pub failed: Vec<PayrollBatchFailure>,
}

impl PayrollBatchResponse {
    /// Starts an empty outcome for `pay_period`.
    pub fn new(pay_period: PayPeriod) -> Self {
        Self {
            pay_period,
            created: Vec::new(),
            without_hours: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Records a failed employee run.
    pub fn push_failure(&mut self, employee_id: impl Into<String>, error: EngineError) {
        let response: ApiErrorResponse = error.into();
        self.failed.push(PayrollBatchFailure {
            employee_id: employee_id.into(),
            error: response.error,
        });
    }
}
