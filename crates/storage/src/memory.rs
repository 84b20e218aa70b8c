//! In-memory store: state lives for the duration of the process. Used as
//! the storage backend on platforms without durable key-value storage and
//! as the backend for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use courtside_domain::StorageError;

use crate::{Key, KeyValueStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: Key) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_ref())
            .cloned())
    }

    async fn set(&self, key: Key, value: String) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.as_ref().to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: Key) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key.as_ref());
        Ok(())
    }
}
