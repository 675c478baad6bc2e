use std::collections::{HashMap, HashSet};

use super::KvStore;
use crate::error::StorageError;

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
    failing_keys: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full quota would.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make writes to `key` alone fail.
    pub fn fail_key(&mut self, key: &str) {
        self.failing_keys.insert(key.to_string());
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes || self.failing_keys.contains(key) {
            return Err(StorageError::write(key, "quota exceeded"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.remove(key);
        Ok(())
    }
}
