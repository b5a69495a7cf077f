//! Request types for the bookkeeping engine API.
//!
//! This module defines the JSON request structures accepted by the
//! endpoints and their conversions into domain types.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Compensation, Employee, EmployeeStatus, ExpenseCategory, ExpenseRecord, InvoiceDetails,
    InvoiceLineItem, InvoiceStatus, PayPeriod, Payment, RangePreset, TimeEntry,
};

fn default_status() -> EmployeeStatus {
    EmployeeStatus::Active
}

/// Employee information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Employment status, active unless stated.
    #[serde(default = "default_status")]
    pub status: EmployeeStatus,
    /// How the employee is paid, e.g. `{"mode": "hourly", "rate": "20.00"}`.
    pub compensation: Compensation,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
}

impl From<EmployeeRequest> for Employee {
    fn from(req: EmployeeRequest) -> Self {
        Employee {
            id: req.id,
            name: req.name,
            position: req.position,
            department: req.department,
            email: req.email,
            status: req.status,
            compensation: req.compensation,
            hire_date: req.hire_date,
        }
    }
}

/// Request body for `PUT /employees/:id`.
///
/// Only the fields present are changed; the id cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployeeRequest {
    /// New full name.
    #[serde(default)]
    pub name: Option<String>,
    /// New job title.
    #[serde(default)]
    pub position: Option<String>,
    /// New department.
    #[serde(default)]
    pub department: Option<String>,
    /// New contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// New status; `inactive` stops time entries and payroll runs.
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
    /// New compensation.
    #[serde(default)]
    pub compensation: Option<Compensation>,
    /// Corrected hire date.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

impl UpdateEmployeeRequest {
    /// Copies the present fields onto `employee`.
    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(position) = self.position {
            employee.position = Some(position);
        }
        if let Some(department) = self.department {
            employee.department = Some(department);
        }
        if let Some(email) = self.email {
            employee.email = Some(email);
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
        if let Some(compensation) = self.compensation {
            employee.compensation = compensation;
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = hire_date;
        }
    }
}

/// Pay period in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl From<PayPeriodRequest> for PayPeriod {
    fn from(req: PayPeriodRequest) -> Self {
        PayPeriod {
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// A time entry in a request; the id is generated when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryRequest {
    /// Unique identifier for the entry.
    #[serde(default)]
    pub id: Option<String>,
    /// The employee who worked the time.
    pub employee_id: String,
    /// The day the time was worked.
    pub date: NaiveDate,
    /// Clock-in time.
    pub start_time: NaiveTime,
    /// Clock-out time.
    pub end_time: NaiveTime,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<TimeEntryRequest> for TimeEntry {
    fn from(req: TimeEntryRequest) -> Self {
        TimeEntry {
            id: req
                .id
                .unwrap_or_else(|| format!("te_{}", Uuid::new_v4().simple())),
            employee_id: req.employee_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            notes: req.notes,
        }
    }
}

/// Request body for `POST /payroll/calculate`.
///
/// Calculates a payroll record from the supplied data without storing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollPreviewRequest {
    /// The employee being paid.
    pub employee: EmployeeRequest,
    /// The period to pay.
    pub pay_period: PayPeriodRequest,
    /// Time entries to aggregate.
    #[serde(default)]
    pub time_entries: Vec<TimeEntryRequest>,
}

/// Request body for `POST /payroll/runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// A registered employee.
    pub employee_id: String,
    /// The period to pay.
    pub pay_period: PayPeriodRequest,
    /// Replace an existing pending record instead of failing.
    #[serde(default)]
    pub recalculate: bool,
}

/// Request body for `POST /payroll/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayrollRequest {
    /// The period to pay every active employee for.
    pub pay_period: PayPeriodRequest,
}

/// Request body for `POST /invoices/totals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemsRequest {
    /// Line items in order.
    pub items: Vec<InvoiceLineItem>,
}

/// Request body for `POST /invoices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Invoice number; generated from the issue date when omitted.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Who is billed.
    pub client_name: String,
    /// Where the invoice is sent.
    #[serde(default)]
    pub client_email: Option<String>,
    /// The date the invoice was issued.
    pub issue_date: NaiveDate,
    /// The date payment is due.
    pub due_date: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Line items in order.
    pub items: Vec<InvoiceLineItem>,
    /// Keep the invoice when some items are rejected.
    #[serde(default)]
    pub allow_filtered: bool,
}

impl CreateInvoiceRequest {
    /// Splits the request into invoice details and line items.
    pub fn into_parts(self, invoice_id: Uuid) -> (InvoiceDetails, Vec<InvoiceLineItem>) {
        let invoice_number = self
            .invoice_number
            .unwrap_or_else(|| generate_invoice_number(self.issue_date, invoice_id));
        (
            InvoiceDetails {
                invoice_number,
                client_name: self.client_name,
                client_email: self.client_email,
                issue_date: self.issue_date,
                due_date: self.due_date,
                notes: self.notes,
            },
            self.items,
        )
    }
}

/// Request body for `PUT /invoices/:id`.
///
/// Only the fields present are changed. Items, when given, replace the
/// current list and are totaled again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// New invoice number.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// New client name.
    #[serde(default)]
    pub client_name: Option<String>,
    /// New client email.
    #[serde(default)]
    pub client_email: Option<String>,
    /// New issue date.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// New due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Replacement line items.
    #[serde(default)]
    pub items: Option<Vec<InvoiceLineItem>>,
    /// Keep the invoice when some replacement items are rejected.
    #[serde(default)]
    pub allow_filtered: bool,
}

impl UpdateInvoiceRequest {
    /// Returns `current` with the present fields replaced, and the items.
    pub fn into_parts(
        self,
        current: &InvoiceDetails,
    ) -> (InvoiceDetails, Option<Vec<InvoiceLineItem>>) {
        let details = InvoiceDetails {
            invoice_number: self
                .invoice_number
                .unwrap_or_else(|| current.invoice_number.clone()),
            client_name: self
                .client_name
                .unwrap_or_else(|| current.client_name.clone()),
            client_email: self.client_email.or_else(|| current.client_email.clone()),
            issue_date: self.issue_date.unwrap_or(current.issue_date),
            due_date: self.due_date.unwrap_or(current.due_date),
            notes: self.notes.or_else(|| current.notes.clone()),
        };
        (details, self.items)
    }
}

/// Builds an invoice number of the form `INV-YYYYMMDD-XXXXXXXX`.
pub fn generate_invoice_number(issue_date: NaiveDate, invoice_id: Uuid) -> String {
    let suffix: String = invoice_id
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("INV-{}-{}", issue_date.format("%Y%m%d"), suffix)
}

/// Request body for `POST /invoices/:id/payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount received.
    pub amount: Decimal,
    /// Date the payment was received.
    pub payment_date: NaiveDate,
    /// How it was paid.
    #[serde(default)]
    pub method: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

impl From<PaymentRequest> for Payment {
    fn from(req: PaymentRequest) -> Self {
        Payment {
            amount: req.amount,
            payment_date: req.payment_date,
            method: req.method,
            reference: req.reference,
        }
    }
}

/// Request body for `POST /invoices/:id/overdue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueRequest {
    /// The date to judge the due date against.
    pub as_of: NaiveDate,
}

/// Request body for `POST /expenses`; the id is generated when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRequest {
    /// Unique identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Amount spent.
    pub amount: Decimal,
    /// The date the expense was incurred.
    pub date: NaiveDate,
    /// What the money was spent on.
    pub description: String,
    /// Who was paid.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl From<ExpenseRequest> for ExpenseRecord {
    fn from(req: ExpenseRequest) -> Self {
        ExpenseRecord {
            id: req
                .id
                .unwrap_or_else(|| format!("exp_{}", Uuid::new_v4().simple())),
            category: req.category,
            amount: req.amount,
            date: req.date,
            description: req.description,
            vendor: req.vendor,
        }
    }
}

/// Query string for `GET /reports/summary`.
///
/// Either both dates or a trailing `preset` must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// First day of the range.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the range.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Trailing window ending today.
    #[serde(default)]
    pub preset: Option<RangePreset>,
}

/// Query string for `GET /employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeListQuery {
    /// Only employees with this status.
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
}

/// Query string for `GET /invoices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceListQuery {
    /// Only invoices with this status.
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

/// Query string for `GET /expenses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseListQuery {
    /// Only expenses in this category.
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
}

/// Query string for `GET /payroll` and `GET /time-entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeFilterQuery {
    /// Only records for this employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}
