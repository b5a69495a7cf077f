//! Time ledger holding raw clock-in/clock-out entries.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayPeriod, TimeEntry};

use super::lock_error;

/// Stores time entries and rejects entries that collide with recorded work.
#[derive(Debug, Clone, Default)]
pub struct TimeLedger {
    entries: Arc<RwLock<BTreeMap<String, TimeEntry>>>,
}

impl TimeLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry for `employee`.
    ///
    /// # Errors
    ///
    /// - `InvalidTimeEntry` if the entry is malformed or names another employee
    /// - `InvalidEmployee` if the employee is inactive
    /// - `DuplicateRecord` if the entry id is taken
    /// - `TimeEntryConflict` if it overlaps an entry already recorded for the employee
    pub fn record(&self, employee: &Employee, entry: TimeEntry) -> EngineResult<TimeEntry> {
        entry.validate()?;
        if entry.employee_id != employee.id {
            return Err(EngineError::InvalidTimeEntry {
                entry_id: entry.id.clone(),
                message: format!(
                    "entry names employee '{}' but was recorded for '{}'",
                    entry.employee_id, employee.id
                ),
            });
        }
        employee.ensure_active()?;

        let mut entries = self.entries.write().map_err(lock_error)?;

        if entries.contains_key(&entry.id) {
            return Err(EngineError::DuplicateRecord {
                entity: "time entry".to_string(),
                id: entry.id.clone(),
            });
        }
        if let Some(existing) = entries
            .values()
            .find(|e| e.employee_id == entry.employee_id && e.overlaps(&entry))
        {
            return Err(EngineError::TimeEntryConflict {
                entry_id: entry.id.clone(),
                existing_id: existing.id.clone(),
            });
        }
        entries.insert(entry.id.clone(), entry.clone());

        Ok(entry)
    }

    /// Returns the entry with the given id.
    pub fn get(&self, entry_id: &str) -> EngineResult<TimeEntry> {
        let entries = self.entries.read().map_err(lock_error)?;

        entries
            .get(entry_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("time entry", entry_id))
    }

    /// Returns an employee's entries dated within the period, ordered by start.
    pub fn entries_for(
        &self,
        employee_id: &str,
        pay_period: &PayPeriod,
    ) -> EngineResult<Vec<TimeEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;

        let mut selected: Vec<TimeEntry> = entries
            .values()
            .filter(|e| e.employee_id == employee_id && pay_period.contains_date(e.date))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()));

        Ok(selected)
    }

    /// Returns all entries ordered by start, optionally for one employee.
    pub fn list(&self, employee_id: Option<&str>) -> EngineResult<Vec<TimeEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;

        let mut selected: Vec<TimeEntry> = entries
            .values()
            .filter(|e| employee_id.is_none_or(|id| e.employee_id == id))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            a.starts_at()
                .cmp(&b.starts_at())
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(selected)
    }

    /// Removes an entry, returning it.
    pub fn remove(&self, entry_id: &str) -> EngineResult<TimeEntry> {
        let mut entries = self.entries.write().map_err(lock_error)?;

        entries
            .remove(entry_id)
            .ok_or_else(|| EngineError::not_found("time entry", entry_id))
    }
}
