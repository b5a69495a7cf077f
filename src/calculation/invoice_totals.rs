//! Invoice totaling functionality.
//!
//! Line items that fail validation are discarded, never coerced, and each
//! rejection is reported with its position so the caller can decide whether
//! a filtered invoice is acceptable.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::InvoiceLineItem;

/// A line item discarded during totaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLineItem {
    /// Zero-based position in the submitted sequence.
    pub index: usize,
    /// The item as submitted.
    pub item: InvoiceLineItem,
    /// Why the item was discarded.
    pub reason: String,
}

/// The valid line items of an invoice and their total.
///
/// Only [`total_line_items`] builds this type, so `total_amount` always
/// equals the sum of `quantity × unit_price` over `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    items: Vec<InvoiceLineItem>,
    rejected: Vec<RejectedLineItem>,
    total_amount: Decimal,
}

impl InvoiceTotals {
    /// Returns the accepted items in submission order.
    pub fn items(&self) -> &[InvoiceLineItem] {
        &self.items
    }

    /// Returns the discarded items.
    pub fn rejected(&self) -> &[RejectedLineItem] {
        &self.rejected
    }

    /// Returns the sum over the accepted items.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Fails if any item was discarded, naming the first one.
    pub fn require_all_valid(self) -> EngineResult<Self> {
        match self.rejected.first() {
            Some(rejected) => Err(EngineError::InvalidLineItem {
                index: rejected.index,
                message: rejected.reason.clone(),
            }),
            None => Ok(self),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<InvoiceLineItem>, Decimal) {
        (self.items, self.total_amount)
    }
}

/// Validates line items and sums `quantity × unit_price` over the valid ones.
///
/// # Errors
///
/// - `NoValidLineItems` if every item was discarded (or none were submitted)
/// - `CalculationError` if a line amount or the total overflows
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::total_line_items;
/// use bookkeeping_engine::models::InvoiceLineItem;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let items = vec![
///     InvoiceLineItem {
///         description: "A".to_string(),
///         quantity: Decimal::from(2),
///         unit_price: Decimal::from_str("10.00").unwrap(),
///     },
///     InvoiceLineItem {
///         description: "".to_string(),
///         quantity: Decimal::from(1),
///         unit_price: Decimal::from_str("5.00").unwrap(),
///     },
/// ];
///
/// let totals = total_line_items(&items).unwrap();
/// assert_eq!(totals.total_amount(), Decimal::from_str("20.00").unwrap());
/// assert_eq!(totals.rejected().len(), 1);
/// assert_eq!(totals.rejected()[0].index, 1);
/// ```
pub fn total_line_items(items: &[InvoiceLineItem]) -> EngineResult<InvoiceTotals> {
    let mut accepted = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    let mut total_amount = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        if let Some(reason) = item.rejection_reason() {
            rejected.push(RejectedLineItem {
                index,
                item: item.clone(),
                reason: reason.to_string(),
            });
            continue;
        }

        let amount = item.amount().ok_or_else(|| EngineError::CalculationError {
            message: format!("line item at position {} overflows", index),
        })?;
        total_amount =
            total_amount
                .checked_add(amount)
                .ok_or_else(|| EngineError::CalculationError {
                    message: "invoice total overflows".to_string(),
                })?;
        accepted.push(item.clone());
    }

    if accepted.is_empty() {
        return Err(EngineError::NoValidLineItems {
            submitted: items.len(),
            rejections: rejected
                .iter()
                .map(|r| format!("position {}: {}", r.index, r.reason))
                .collect(),
        });
    }

    Ok(InvoiceTotals {
        items: accepted,
        rejected,
        total_amount,
    })
}
