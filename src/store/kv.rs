//! String key-value storage the alert state is persisted in

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;

use crate::error::StorageError;

/// Trait for storing and retrieving preference strings
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several entries at once.
    ///
    /// Backends that support transactions override this to make the write
    /// atomic. The default writes entries one by one and stops at the first
    /// failure.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        for (key, value) in &entries {
            self.set_string(key, value).await?;
        }
        Ok(())
    }
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock_values()?.get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock_values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock_values()?.remove(key);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        self.lock_values()?.extend(entries);
        Ok(())
    }
}
