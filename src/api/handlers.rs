//! HTTP request handlers for the bookkeeping engine API.
//!
//! This module contains the handler functions for all API endpoints.
//! Every handler tags its log lines with a fresh correlation id.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{InvoiceTotals, RejectedLineItem, summarize, total_line_items};
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::models::{
    Compensation, DateRange, Employee, ExpenseRecord, FinancialSummary, Invoice,
    InvoiceLineItem, PayPeriod, PayrollRecord, TimeEntry,
};

use super::request::{
    CreateInvoiceRequest, EmployeeFilterQuery, EmployeeListQuery, EmployeeRequest,
    ExpenseListQuery, ExpenseRequest, InvoiceListQuery, LineItemsRequest, OverdueRequest,
    PaymentRequest, PayrollPreviewRequest, PayrollRunRequest, ProcessPayrollRequest, ReportQuery,
    TimeEntryRequest, UpdateEmployeeRequest, UpdateInvoiceRequest,
};
use super::response::{ApiError, ApiErrorResponse, InvoiceResponse, PayrollBatchResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/employees",
            post(create_employee_handler).get(list_employees_handler),
        )
        .route(
            "/employees/:id",
            get(get_employee_handler).put(update_employee_handler),
        )
        .route(
            "/time-entries",
            post(record_time_entry_handler).get(list_time_entries_handler),
        )
        .route("/time-entries/:id", delete(delete_time_entry_handler))
        .route("/payroll", get(list_payroll_handler))
        .route("/payroll/calculate", post(preview_payroll_handler))
        .route("/payroll/runs", post(run_payroll_handler))
        .route("/payroll/process", post(process_payroll_handler))
        .route("/payroll/:id", get(get_payroll_handler))
        .route("/payroll/:id/pay", post(pay_payroll_handler))
        .route("/invoices/totals", post(invoice_totals_handler))
        .route(
            "/invoices",
            post(create_invoice_handler).get(list_invoices_handler),
        )
        .route(
            "/invoices/:id",
            get(get_invoice_handler)
                .put(update_invoice_handler)
                .delete(delete_invoice_handler),
        )
        .route("/invoices/:id/send", post(send_invoice_handler))
        .route("/invoices/:id/payments", post(record_payment_handler))
        .route("/invoices/:id/cancel", post(cancel_invoice_handler))
        .route("/invoices/:id/overdue", post(mark_overdue_handler))
        .route(
            "/expenses",
            post(create_expense_handler).get(list_expenses_handler),
        )
        .route("/reports/summary", get(report_summary_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    match err.kind() {
        ErrorKind::ConfigurationError | ErrorKind::StorageError => {
            error!(correlation_id = %correlation_id, error = %err, "Request failed");
        }
        kind => {
            warn!(correlation_id = %correlation_id, kind = ?kind, error = %err, "Request rejected");
        }
    }
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the failure
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            "MISSING_CONTENT_TYPE",
            ErrorKind::ValidationError,
            "Content-Type must be application/json",
        ),
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection.body_text(),
        "Query string error"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::validation_error(rejection.body_text()),
    )
}

fn parse_record_id(entity: &str, raw: &str) -> EngineResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::not_found(entity, raw))
}

/// Handler for POST /employees.
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Registering employee");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let employee: Employee = request.into();

    let result = employee
        .validate()
        .and_then(|()| state.employees().insert(employee.id.clone(), employee));
    match result {
        Ok(employee) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee.id,
                mode = employee.compensation.mode_name(),
                "Employee registered"
            );
            json_response(StatusCode::CREATED, employee)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id.
async fn get_employee_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    match state.employees().get(&employee_id) {
        Ok(employee) => json_response(StatusCode::OK, employee),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees.
async fn list_employees_handler(
    State(state): State<AppState>,
    query: Result<Query<EmployeeListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.employees().list() {
        Ok(employees) => {
            let employees: Vec<Employee> = employees
                .into_iter()
                .filter(|e| query.status.is_none_or(|status| e.status == status))
                .collect();
            json_response(StatusCode::OK, employees)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /employees/:id.
///
/// Changes the fields present in the body. Setting `status` to `inactive`
/// stops further time entries and payroll runs for the employee.
async fn update_employee_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %employee_id, "Updating employee");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let result = state.employees().update(&employee_id, |employee| {
        request.apply_to(employee);
        employee.validate()
    });
    match result {
        Ok((employee, ())) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee.id,
                active = employee.is_active(),
                mode = employee.compensation.mode_name(),
                "Employee updated"
            );
            json_response(StatusCode::OK, employee)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /time-entries.
async fn list_time_entries_handler(
    State(state): State<AppState>,
    query: Result<Query<EmployeeFilterQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.ledger().list(query.employee_id.as_deref()) {
        Ok(entries) => json_response(StatusCode::OK, entries),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /time-entries.
///
/// The employee must be registered and active; entries that overlap
/// recorded work are refused with 409.
async fn record_time_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<TimeEntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Recording time entry");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let entry: TimeEntry = request.into();

    let result = state
        .employees()
        .get(&entry.employee_id)
        .and_then(|employee| state.ledger().record(&employee, entry));
    match result {
        Ok(entry) => {
            info!(
                correlation_id = %correlation_id,
                entry_id = %entry.id,
                employee_id = %entry.employee_id,
                worked_minutes = entry.worked_minutes(),
                "Time entry recorded"
            );
            json_response(StatusCode::CREATED, entry)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /time-entries/:id.
async fn delete_time_entry_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, entry_id = %entry_id, "Removing time entry");

    match remove_time_entry(&state, &entry_id) {
        Ok(entry) => json_response(StatusCode::OK, entry),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Removes an entry unless a paid payroll record was built from it.
fn remove_time_entry(state: &AppState, entry_id: &str) -> EngineResult<TimeEntry> {
    let entry = state.ledger().get(entry_id)?;
    let frozen = state
        .payroll()
        .for_employee(&entry.employee_id)?
        .into_iter()
        .find(|record| record.is_paid() && record.entry_ids.iter().any(|id| id == entry_id));
    if let Some(record) = frozen {
        return Err(EngineError::PayrollRecordImmutable {
            record_id: record.id,
        });
    }
    state.ledger().remove(entry_id)
}

/// Handler for POST /payroll/calculate.
///
/// Calculates a payroll record from the request alone; nothing is stored.
async fn preview_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollPreviewRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll preview");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let employee: Employee = request.employee.into();
    let pay_period: PayPeriod = request.pay_period.into();
    let entries: Vec<TimeEntry> = request.time_entries.into_iter().map(Into::into).collect();

    let start_time = Instant::now();
    match state.calculator().run(&employee, &pay_period, &entries) {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee.id,
                entries_count = entries.len(),
                gross_pay = %record.gross_pay,
                net_pay = %record.net_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll preview calculated"
            );
            json_response(StatusCode::OK, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/runs.
///
/// Aggregates the employee's ledger entries for the period, calculates the
/// record and stores it. A second run for the same employee and period is
/// refused with 409 unless `recalculate` is set and the record is unpaid.
async fn run_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match run_payroll(&state, request) {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                payroll_id = %record.id,
                employee_id = %record.employee_id,
                gross_pay = %record.gross_pay,
                net_pay = %record.net_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll run stored"
            );
            json_response(StatusCode::CREATED, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn run_payroll(state: &AppState, request: PayrollRunRequest) -> EngineResult<PayrollRecord> {
    let employee = state.employees().get(&request.employee_id)?;
    let pay_period = PayPeriod::new(request.pay_period.start_date, request.pay_period.end_date)?;
    let entries = state.ledger().entries_for(&employee.id, &pay_period)?;

    let record = state.calculator().run(&employee, &pay_period, &entries)?;
    if request.recalculate {
        state.payroll().replace_pending(record)
    } else {
        state.payroll().insert(record)
    }
}

/// Handler for POST /payroll/process.
///
/// Runs payroll for every active employee over one period. Hourly employees
/// without recorded time are listed and skipped; per-employee failures are
/// reported without stopping the batch.
async fn process_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll batch");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match process_payroll(&state, request) {
        Ok(batch) => {
            info!(
                correlation_id = %correlation_id,
                period_start = %batch.pay_period.start_date,
                period_end = %batch.pay_period.end_date,
                created = batch.created.len(),
                without_hours = batch.without_hours.len(),
                failed = batch.failed.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Payroll batch processed"
            );
            json_response(StatusCode::OK, batch)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn process_payroll(
    state: &AppState,
    request: ProcessPayrollRequest,
) -> EngineResult<PayrollBatchResponse> {
    let pay_period = PayPeriod::new(request.pay_period.start_date, request.pay_period.end_date)?;
    let mut batch = PayrollBatchResponse::new(pay_period);

    for employee in state.employees().list()?.into_iter().filter(|e| e.is_active()) {
        let entries = state.ledger().entries_for(&employee.id, &pay_period)?;
        if entries.is_empty() && matches!(employee.compensation, Compensation::Hourly { .. }) {
            batch.without_hours.push(employee.id);
            continue;
        }

        let outcome = state
            .calculator()
            .run(&employee, &pay_period, &entries)
            .and_then(|record| state.payroll().insert(record));
        match outcome {
            Ok(record) => batch.created.push(record),
            Err(err) if err.kind() == ErrorKind::StorageError => return Err(err),
            Err(err) => batch.push_failure(employee.id, err),
        }
    }

    Ok(batch)
}

/// Handler for GET /payroll.
async fn list_payroll_handler(
    State(state): State<AppState>,
    query: Result<Query<EmployeeFilterQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    let result = match query.employee_id {
        Some(employee_id) => state.payroll().for_employee(&employee_id),
        None => state.payroll().list(),
    };
    match result {
        Ok(records) => json_response(StatusCode::OK, records),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll/:id.
async fn get_payroll_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = parse_record_id("payroll record", &record_id)
        .and_then(|id| state.payroll().get(&id));
    match result {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/:id/pay.
async fn pay_payroll_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, payroll_id = %record_id, "Marking payroll paid");

    let result = parse_record_id("payroll record", &record_id)
        .and_then(|id| state.payroll().mark_paid(&id));
    match result {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                payroll_id = %record.id,
                net_pay = %record.net_pay,
                "Payroll record paid"
            );
            json_response(StatusCode::OK, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /invoices/totals.
///
/// Totals line items without creating an invoice. Invalid items are listed
/// under `rejected` and left out of the total.
async fn invoice_totals_handler(payload: Result<Json<LineItemsRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Totaling line items");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match total_line_items(&request.items) {
        Ok(totals) => {
            info!(
                correlation_id = %correlation_id,
                accepted = totals.items().len(),
                rejected = totals.rejected().len(),
                total_amount = %totals.total_amount(),
                "Line items totaled"
            );
            json_response(StatusCode::OK, totals)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /invoices.
async fn create_invoice_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Creating invoice");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match create_invoice(&state, request) {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                invoice_id = %response.invoice.id(),
                invoice_number = %response.invoice.details().invoice_number,
                total_amount = %response.invoice.total_amount(),
                rejected = response.rejected_items.len(),
                "Draft invoice created"
            );
            json_response(StatusCode::CREATED, response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Totals items, refusing any rejection unless `allow_filtered` is set.
fn total_invoice_items(
    items: &[InvoiceLineItem],
    allow_filtered: bool,
) -> EngineResult<(InvoiceTotals, Vec<RejectedLineItem>)> {
    let mut totals = total_line_items(items)?;
    let rejected_items = totals.rejected().to_vec();
    if !allow_filtered {
        totals = totals.require_all_valid()?;
    }
    Ok((totals, rejected_items))
}

fn create_invoice(state: &AppState, request: CreateInvoiceRequest) -> EngineResult<InvoiceResponse> {
    let allow_filtered = request.allow_filtered;
    let invoice_id = Uuid::new_v4();
    let (details, items) = request.into_parts(invoice_id);

    let (totals, rejected_items) = total_invoice_items(&items, allow_filtered)?;
    let invoice = Invoice::new(invoice_id, details, totals)?;
    let invoice = state.invoices().insert(invoice_id, invoice)?;

    Ok(InvoiceResponse {
        rejected_items,
        ..InvoiceResponse::from(invoice)
    })
}

/// Handler for GET /invoices/:id.
async fn get_invoice_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result =
        parse_record_id("invoice", &invoice_id).and_then(|id| state.invoices().get(&id));
    match result {
        Ok(invoice) => json_response(StatusCode::OK, InvoiceResponse::from(invoice)),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /invoices.
async fn list_invoices_handler(
    State(state): State<AppState>,
    query: Result<Query<InvoiceListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.invoices().list() {
        Ok(invoices) => {
            let invoices: Vec<InvoiceResponse> = invoices
                .into_iter()
                .filter(|i| query.status.is_none_or(|status| i.status() == status))
                .map(InvoiceResponse::from)
                .collect();
            json_response(StatusCode::OK, invoices)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /invoices/:id.
///
/// Edits a draft invoice. Replacement items are totaled like a new
/// invoice's items.
async fn update_invoice_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    payload: Result<Json<UpdateInvoiceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    info!(correlation_id = %correlation_id, invoice_id = %invoice_id, "Editing invoice");

    match update_invoice(&state, &invoice_id, request) {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                invoice_id = %response.invoice.id(),
                total_amount = %response.invoice.total_amount(),
                rejected = response.rejected_items.len(),
                "Draft invoice edited"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn update_invoice(
    state: &AppState,
    invoice_id: &str,
    request: UpdateInvoiceRequest,
) -> EngineResult<InvoiceResponse> {
    let id = parse_record_id("invoice", invoice_id)?;
    let allow_filtered = request.allow_filtered;

    let (invoice, rejected_items) = state.invoices().update(&id, |invoice| {
        let (details, items) = request.into_parts(invoice.details());
        invoice.replace_details(details)?;
        match items {
            Some(items) => {
                let (totals, rejected_items) = total_invoice_items(&items, allow_filtered)?;
                invoice.replace_items(totals)?;
                Ok(rejected_items)
            }
            None => Ok(Vec::new()),
        }
    })?;

    Ok(InvoiceResponse {
        rejected_items,
        ..InvoiceResponse::from(invoice)
    })
}

/// Handler for DELETE /invoices/:id.
///
/// Only drafts and cancelled invoices without payments can be deleted.
async fn delete_invoice_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, invoice_id = %invoice_id, "Deleting invoice");

    let result = parse_record_id("invoice", &invoice_id)
        .and_then(|id| state.invoices().remove_if(&id, Invoice::ensure_removable));
    match result {
        Ok(invoice) => {
            info!(
                correlation_id = %correlation_id,
                invoice_id = %invoice.id(),
                status = %invoice.status(),
                "Invoice deleted"
            );
            json_response(StatusCode::OK, InvoiceResponse::from(invoice))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Applies a change to a stored invoice and logs the resulting status.
fn change_invoice<R>(
    state: &AppState,
    correlation_id: Uuid,
    invoice_id: &str,
    action: &str,
    change: impl FnOnce(&mut Invoice) -> EngineResult<R>,
) -> Response {
    info!(
        correlation_id = %correlation_id,
        invoice_id = %invoice_id,
        action,
        "Updating invoice"
    );

    let result = parse_record_id("invoice", invoice_id)
        .and_then(|id| state.invoices().update(&id, change));
    match result {
        Ok((invoice, _)) => {
            info!(
                correlation_id = %correlation_id,
                invoice_id = %invoice.id(),
                status = %invoice.status(),
                balance_due = %invoice.balance_due(),
                "Invoice updated"
            );
            json_response(StatusCode::OK, InvoiceResponse::from(invoice))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /invoices/:id/send.
async fn send_invoice_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Response {
    change_invoice(&state, Uuid::new_v4(), &invoice_id, "send", |invoice| {
        invoice.send()
    })
}

/// Handler for POST /invoices/:id/payments.
async fn record_payment_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    change_invoice(&state, correlation_id, &invoice_id, "payment", move |invoice| {
        invoice.record_payment(request.into())
    })
}

/// Handler for POST /invoices/:id/cancel.
async fn cancel_invoice_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Response {
    change_invoice(&state, Uuid::new_v4(), &invoice_id, "cancel", |invoice| {
        invoice.cancel()
    })
}

/// Handler for POST /invoices/:id/overdue.
///
/// Marks a sent invoice overdue if `as_of` is past its due date; otherwise
/// the invoice is returned unchanged.
async fn mark_overdue_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    payload: Result<Json<OverdueRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    change_invoice(&state, correlation_id, &invoice_id, "overdue", move |invoice| {
        invoice.mark_overdue_if_due(request.as_of)
    })
}

/// Handler for POST /expenses.
async fn create_expense_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExpenseRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Recording expense");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let expense: ExpenseRecord = request.into();

    let result = expense
        .validate()
        .and_then(|()| state.expenses().insert(expense.id.clone(), expense));
    match result {
        Ok(expense) => {
            info!(
                correlation_id = %correlation_id,
                expense_id = %expense.id,
                category = %expense.category,
                amount = %expense.amount,
                "Expense recorded"
            );
            json_response(StatusCode::CREATED, expense)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /expenses.
async fn list_expenses_handler(
    State(state): State<AppState>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.expenses().list() {
        Ok(expenses) => {
            let expenses: Vec<ExpenseRecord> = expenses
                .into_iter()
                .filter(|e| query.category.is_none_or(|category| e.category == category))
                .collect();
            json_response(StatusCode::OK, expenses)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /reports/summary.
///
/// Takes either `start_date` and `end_date` or a trailing `preset`.
async fn report_summary_handler(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Building financial summary");

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    let range = match (query.start_date, query.end_date, query.preset) {
        (Some(start_date), Some(end_date), None) => DateRange::new(start_date, end_date),
        (None, None, Some(preset)) => DateRange::trailing(preset, Utc::now().date_naive()),
        _ => {
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(
                    "Provide either start_date and end_date, or a preset",
                ),
            );
        }
    };

    let start_time = Instant::now();
    match range.and_then(|range| build_summary(&state, &range)) {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                start_date = %summary.range.start_date,
                end_date = %summary.range.end_date,
                total_revenue = %summary.total_revenue,
                net_profit = %summary.net_profit,
                duration_us = start_time.elapsed().as_micros(),
                "Financial summary built"
            );
            json_response(StatusCode::OK, summary)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn build_summary(state: &AppState, range: &DateRange) -> EngineResult<FinancialSummary> {
    let payroll = state.payroll().list()?;
    let invoices = state.invoices().list()?;
    let expenses = state.expenses().list()?;
    summarize(range, &payroll, &invoices, &expenses)
}
