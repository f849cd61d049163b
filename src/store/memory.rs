// RKSOK — In-memory Phonebook Store

use std::collections::HashMap;
use std::sync::RwLock;

use super::repository::PhonebookStore;
use super::StoreError;

/// Process-local phonebook. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryPhonebookStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryPhonebookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given records.
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Other("phonebook lock poisoned".to_string())
}

impl PhonebookStore for MemoryPhonebookStore {
    fn fetch(&self, name: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(name).cloned())
    }

    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(name.to_string(), payload.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records.remove(name).is_some())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
