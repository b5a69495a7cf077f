//! Generic in-memory record store.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, EngineResult};

use super::lock_error;

/// A keyed collection of records behind a read-write lock.
///
/// Cloning the store shares the underlying map. Records are kept in key
/// order so listings are deterministic.
#[derive(Debug)]
pub struct RecordStore<K, V> {
    entity: &'static str,
    records: Arc<RwLock<BTreeMap<K, V>>>,
}

impl<K, V> Clone for RecordStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            records: Arc::clone(&self.records),
        }
    }
}

impl<K, V> RecordStore<K, V>
where
    K: Ord + Clone + Display,
    V: Clone,
{
    /// Creates an empty store; `entity` names the records in errors.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Inserts a new record, failing if the key is taken.
    pub fn insert(&self, key: K, value: V) -> EngineResult<V> {
        let mut records = self.records.write().map_err(lock_error)?;

        if records.contains_key(&key) {
            return Err(EngineError::DuplicateRecord {
                entity: self.entity.to_string(),
                id: key.to_string(),
            });
        }
        records.insert(key, value.clone());

        Ok(value)
    }

    /// Returns a copy of the record stored under `key`.
    pub fn get(&self, key: &K) -> EngineResult<V> {
        let records = self.records.read().map_err(lock_error)?;

        records
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::not_found(self.entity, key.to_string()))
    }

    /// Applies `change` to the record under `key` while holding the write lock.
    ///
    /// The record is only written back if `change` succeeds.
    pub fn update<R>(
        &self,
        key: &K,
        change: impl FnOnce(&mut V) -> EngineResult<R>,
    ) -> EngineResult<(V, R)> {
        let mut records = self.records.write().map_err(lock_error)?;

        let stored = records
            .get_mut(key)
            .ok_or_else(|| EngineError::not_found(self.entity, key.to_string()))?;
        let mut working = stored.clone();
        let outcome = change(&mut working)?;
        *stored = working.clone();

        Ok((working, outcome))
    }

    /// Removes the record under `key` if `check` accepts it, returning it.
    ///
    /// The check and the removal happen under one write lock.
    pub fn remove_if(
        &self,
        key: &K,
        check: impl FnOnce(&V) -> EngineResult<()>,
    ) -> EngineResult<V> {
        let mut records = self.records.write().map_err(lock_error)?;

        let stored = records
            .get(key)
            .ok_or_else(|| EngineError::not_found(self.entity, key.to_string()))?;
        check(stored)?;

        records
            .remove(key)
            .ok_or_else(|| EngineError::not_found(self.entity, key.to_string()))
    }

    /// Returns every record in key order.
    pub fn list(&self) -> EngineResult<Vec<V>> {
        let records = self.records.read().map_err(lock_error)?;

        Ok(records.values().cloned().collect())
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.records.read().map_err(lock_error)?.len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }
}
