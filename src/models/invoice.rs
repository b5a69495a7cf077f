//! Invoice models.
//!
//! This module defines [`Invoice`], its [`InvoiceLineItem`]s, recorded
//! [`Payment`]s and the forward-only [`InvoiceStatus`] lifecycle.
//!
//! An invoice's total is never set directly: it is taken from the
//! [`InvoiceTotals`] produced by the invoice totaler, and re-derived from the
//! line items whenever an invoice is deserialized.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{InvoiceTotals, total_line_items};
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of an invoice.
///
/// Status only moves forward: `draft → sent → {paid, overdue, cancelled}`,
/// `overdue → {paid, cancelled}`, and a draft may be cancelled outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being prepared; items may still change.
    Draft,
    /// Delivered to the client and awaiting payment.
    Sent,
    /// Fully paid.
    Paid,
    /// Sent and past its due date without full payment.
    Overdue,
    /// Withdrawn.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if `next` is a legal forward move from this status.
    ///
    /// # Example
    ///
    /// ```
    /// use bookkeeping_engine::models::InvoiceStatus;
    ///
    /// assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
    /// assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Overdue));
    /// assert!(!InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Draft));
    /// assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Cancelled));
    /// ```
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Overdue, Cancelled)
        )
    }

    /// Returns true for statuses whose total is still owed by the client.
    pub fn is_outstanding(self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billable line on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// What was delivered.
    pub description: String,
    /// How many units.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl InvoiceLineItem {
    /// Returns why the item cannot be billed, or `None` if it is valid.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        if self.description.trim().is_empty() {
            Some("description must not be empty")
        } else if self.quantity <= Decimal::ZERO {
            Some("quantity must be greater than zero")
        } else if self.unit_price <= Decimal::ZERO {
            Some("unit price must be greater than zero")
        } else {
            None
        }
    }

    /// Returns `quantity × unit_price`, or `None` on overflow.
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// A payment received against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Amount received.
    pub amount: Decimal,
    /// Date the payment was received.
    pub payment_date: NaiveDate,
    /// How it was paid (e.g., "bank_transfer", "check").
    #[serde(default)]
    pub method: Option<String>,
    /// External reference such as a check number.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Client-facing fields of an invoice that the caller controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    /// Human-readable invoice number (e.g., "INV-20260115-1A2B3C4D").
    pub invoice_number: String,
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
}

/// Serialized shape of an invoice; the total is recomputed on the way in.
#[derive(Debug, Clone, Deserialize)]
struct InvoiceData {
    id: Uuid,
    #[serde(flatten)]
    details: InvoiceDetails,
    status: InvoiceStatus,
    items: Vec<InvoiceLineItem>,
    #[serde(default)]
    payments: Vec<Payment>,
}

/// An invoice owning its line items and payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InvoiceData")]
pub struct Invoice {
    id: Uuid,
    #[serde(flatten)]
    details: InvoiceDetails,
    status: InvoiceStatus,
    items: Vec<InvoiceLineItem>,
    total_amount: Decimal,
    payments: Vec<Payment>,
}

impl TryFrom<InvoiceData> for Invoice {
    type Error = EngineError;

    fn try_from(data: InvoiceData) -> Result<Self, Self::Error> {
        let totals = total_line_items(&data.items)?.require_all_valid()?;
        let mut invoice = Invoice::new(data.id, data.details, totals)?;
        invoice.status = data.status;
        if invoice.status == InvoiceStatus::Draft && !data.payments.is_empty() {
            return Err(invoice.invalid("draft invoices cannot carry payments"));
        }
        for payment in data.payments {
            invoice.check_payment(payment.amount)?;
            invoice.payments.push(payment);
        }
        Ok(invoice)
    }
}

impl Invoice {
    /// Creates a draft invoice from totaled line items.
    pub fn new(id: Uuid, details: InvoiceDetails, totals: InvoiceTotals) -> EngineResult<Self> {
        if details.client_name.trim().is_empty() {
            return Err(EngineError::InvalidInvoice {
                invoice_id: id.to_string(),
                message: "client name must not be empty".to_string(),
            });
        }
        let (items, total_amount) = totals.into_parts();
        Ok(Self {
            id,
            details,
            status: InvoiceStatus::Draft,
            items,
            total_amount,
            payments: Vec::new(),
        })
    }

    /// Returns the invoice identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the client-facing details.
    pub fn details(&self) -> &InvoiceDetails {
        &self.details
    }

    /// Returns the date the invoice was issued.
    pub fn issue_date(&self) -> NaiveDate {
        self.details.issue_date
    }

    /// Returns the current status.
    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    /// Returns the billed line items in order.
    pub fn items(&self) -> &[InvoiceLineItem] {
        &self.items
    }

    /// Returns the sum of `quantity × unit_price` over all items.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Returns the payments received so far.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Returns the sum of all payments received.
    ///
    /// Payments never exceed the total, so the sum cannot overflow for an
    /// invoice built through this type.
    pub fn amount_paid(&self) -> Decimal {
        self.payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.amount))
            .unwrap_or(Decimal::MAX)
    }

    /// Returns what the client still owes.
    pub fn balance_due(&self) -> Decimal {
        (self.total_amount - self.amount_paid()).max(Decimal::ZERO)
    }

    /// Replaces the line items of a draft invoice.
    pub fn replace_items(&mut self, totals: InvoiceTotals) -> EngineResult<()> {
        self.ensure_draft("items")?;
        let (items, total_amount) = totals.into_parts();
        self.items = items;
        self.total_amount = total_amount;
        Ok(())
    }

    /// Replaces the client-facing details of a draft invoice.
    pub fn replace_details(&mut self, details: InvoiceDetails) -> EngineResult<()> {
        self.ensure_draft("details")?;
        if details.client_name.trim().is_empty() {
            return Err(self.invalid("client name must not be empty"));
        }
        self.details = details;
        Ok(())
    }

    /// Fails unless the invoice may be deleted.
    ///
    /// Drafts and cancelled invoices without payments can be deleted; anything
    /// the client has been billed for or has paid against stays on the books.
    pub fn ensure_removable(&self) -> EngineResult<()> {
        let removable = matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled);
        if !removable || !self.payments.is_empty() {
            return Err(self.invalid(format!(
                "only draft or unpaid cancelled invoices can be deleted, not {}",
                self.status
            )));
        }
        Ok(())
    }

    fn ensure_draft(&self, what: &str) -> EngineResult<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(self.invalid(format!(
                "{} can only change while the invoice is draft, not {}",
                what, self.status
            )));
        }
        Ok(())
    }

    /// Moves the invoice to `next`, enforcing forward-only transitions.
    ///
    /// Sending additionally requires a positive total and a due date on or
    /// after the issue date.
    pub fn transition_to(&mut self, next: InvoiceStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                invoice_id: self.id.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        if next == InvoiceStatus::Sent {
            if self.total_amount <= Decimal::ZERO {
                return Err(self.invalid("total amount must be greater than zero to send"));
            }
            if self.details.due_date < self.details.issue_date {
                return Err(self.invalid(format!(
                    "due date {} is before issue date {}",
                    self.details.due_date, self.details.issue_date
                )));
            }
        }
        self.status = next;
        Ok(())
    }

    /// Sends a draft invoice.
    pub fn send(&mut self) -> EngineResult<()> {
        self.transition_to(InvoiceStatus::Sent)
    }

    /// Cancels the invoice.
    pub fn cancel(&mut self) -> EngineResult<()> {
        self.transition_to(InvoiceStatus::Cancelled)
    }

    /// Marks a sent invoice overdue if `today` is past its due date.
    ///
    /// Returns whether the status changed.
    pub fn mark_overdue_if_due(&mut self, today: NaiveDate) -> EngineResult<bool> {
        if self.status == InvoiceStatus::Sent && today > self.details.due_date {
            self.transition_to(InvoiceStatus::Overdue)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Records a payment; the invoice becomes paid once nothing is owed.
    pub fn record_payment(&mut self, payment: Payment) -> EngineResult<()> {
        if !self.status.is_outstanding() {
            return Err(self.invalid(format!(
                "payments can only be recorded against sent or overdue invoices, not {}",
                self.status
            )));
        }
        self.check_payment(payment.amount)?;
        self.payments.push(payment);
        if self.balance_due() == Decimal::ZERO {
            self.transition_to(InvoiceStatus::Paid)?;
        }
        Ok(())
    }

    fn check_payment(&self, amount: Decimal) -> EngineResult<()> {
        if amount <= Decimal::ZERO {
            return Err(self.invalid("payment amount must be greater than zero"));
        }
        if amount > self.balance_due() {
            return Err(self.invalid(format!(
                "payment of {} exceeds balance due of {}",
                amount,
                self.balance_due()
            )));
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> EngineError {
        EngineError::InvalidInvoice {
            invoice_id: self.id.to_string(),
            message: message.into(),
        }
    }
}
