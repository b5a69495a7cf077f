//! In-memory record stores.
//!
//! Every store wraps its map in `Arc<RwLock<..>>`, so clones share state and
//! can be handed to request handlers. A poisoned lock surfaces as
//! [`EngineError::StorageUnavailable`](crate::error::EngineError::StorageUnavailable).

mod payroll_store;
mod record_store;
mod time_ledger;

use std::fmt::Display;

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Employee, ExpenseRecord, Invoice};

pub use payroll_store::PayrollStore;
pub use record_store::RecordStore;
pub use time_ledger::TimeLedger;

/// Employees keyed by id.
pub type EmployeeStore = RecordStore<String, Employee>;

/// Invoices keyed by id.
pub type InvoiceStore = RecordStore<Uuid, Invoice>;

/// Expenses keyed by id.
pub type ExpenseStore = RecordStore<String, ExpenseRecord>;

fn lock_error<E: Display>(e: E) -> EngineError {
    EngineError::StorageUnavailable {
        message: format!("Failed to acquire lock: {}", e),
    }
}
