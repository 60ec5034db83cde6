//! Key-value persistence for the selection state

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;

/// Storage key holding the last selected wallet id
pub const SELECTED_WALLET_KEY: &str = "selected-wallet-id";

/// Durable key-value storage contract.
///
/// The library only ever reads and writes string values under string keys;
/// embedders supply whatever engine backs this (browser local storage, a
/// file, a database row).
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`, if present
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage backend.
///
/// Default choice for tests and embedders without a durable store. Cloning
/// shares the underlying map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
