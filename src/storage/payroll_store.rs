//! Payroll record store.
//!
//! Enforces one record per employee and pay period, and no overlapping
//! periods for the same employee. The check and the insert happen inside a
//! single write critical section, so of two concurrent runs for the same
//! employee and period exactly one is stored.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::PayrollRecord;

use super::lock_error;

/// Stores payroll records keyed by their deterministic id.
#[derive(Debug, Clone, Default)]
pub struct PayrollStore {
    records: Arc<RwLock<BTreeMap<Uuid, PayrollRecord>>>,
}

impl PayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a newly calculated record.
    ///
    /// # Errors
    ///
    /// - `DuplicatePayrollRun` if the employee already has a record for the period
    /// - `OverlappingPayPeriod` if another of the employee's periods shares a day
    pub fn insert(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let mut records = self.records.write().map_err(lock_error)?;

        if records.contains_key(&record.id) {
            return Err(EngineError::DuplicatePayrollRun {
                employee_id: record.employee_id.clone(),
                start_date: record.pay_period.start_date,
                end_date: record.pay_period.end_date,
            });
        }
        Self::check_overlap(&records, &record)?;
        records.insert(record.id, record.clone());

        Ok(record)
    }

    /// Replaces a pending record with a recalculated one.
    ///
    /// Stores the record if none exists yet. Fails with
    /// `PayrollRecordImmutable` if the stored record is already paid.
    pub fn replace_pending(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let mut records = self.records.write().map_err(lock_error)?;

        if let Some(existing) = records.get(&record.id) {
            if existing.is_paid() {
                return Err(EngineError::PayrollRecordImmutable {
                    record_id: existing.id,
                });
            }
        }
        Self::check_overlap(&records, &record)?;
        records.insert(record.id, record.clone());

        Ok(record)
    }

    fn check_overlap(
        records: &BTreeMap<Uuid, PayrollRecord>,
        record: &PayrollRecord,
    ) -> EngineResult<()> {
        let clash = records.values().find(|existing| {
            existing.id != record.id
                && existing.employee_id == record.employee_id
                && existing.pay_period.overlaps(&record.pay_period)
        });
        match clash {
            Some(existing) => Err(EngineError::OverlappingPayPeriod {
                employee_id: record.employee_id.clone(),
                start_date: record.pay_period.start_date,
                end_date: record.pay_period.end_date,
                existing_id: existing.id,
            }),
            None => Ok(()),
        }
    }

    /// Returns the record with the given id.
    pub fn get(&self, id: &Uuid) -> EngineResult<PayrollRecord> {
        let records = self.records.read().map_err(lock_error)?;

        records
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("payroll record", id.to_string()))
    }

    /// Marks a pending record paid, freezing it.
    pub fn mark_paid(&self, id: &Uuid) -> EngineResult<PayrollRecord> {
        let mut records = self.records.write().map_err(lock_error)?;

        let record = records
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("payroll record", id.to_string()))?;
        record.mark_paid()?;

        Ok(record.clone())
    }

    /// Returns all records ordered by period start, then employee.
    pub fn list(&self) -> EngineResult<Vec<PayrollRecord>> {
        let records = self.records.read().map_err(lock_error)?;

        let mut all: Vec<PayrollRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            a.pay_period
                .start_date
                .cmp(&b.pay_period.start_date)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        Ok(all)
    }

    /// Returns one employee's records ordered by period start.
    pub fn for_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect())
    }
}
