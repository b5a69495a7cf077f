//! HTTP API module for the bookkeeping engine.
//!
//! This module provides the REST endpoints for registering employees and
//! time, running payroll, managing invoices and expenses, and building
//! financial summaries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CreateInvoiceRequest, EmployeeFilterQuery, EmployeeListQuery, EmployeeRequest,
    ExpenseListQuery, ExpenseRequest, InvoiceListQuery, LineItemsRequest, OverdueRequest,
    PayPeriodRequest, PaymentRequest, PayrollPreviewRequest, PayrollRunRequest,
    ProcessPayrollRequest, ReportQuery, TimeEntryRequest, UpdateEmployeeRequest,
    UpdateInvoiceRequest, generate_invoice_number,
};
pub use response::{
    ApiError, ApiErrorResponse, InvoiceResponse, PayrollBatchFailure, PayrollBatchResponse,
    status_for,
};
pub use state::AppState;
