use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::StorageKey;
use crate::domain::ports::{FileStorage, FileStorageError};

/// File storage backed by a map, keyed by the storage key string.
#[derive(Default)]
pub struct MemoryFileStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn put(&self, key: &StorageKey, bytes: Vec<u8>) -> Result<(), FileStorageError> {
        self.files
            .write()
            .map_err(|_| FileStorageError::io("memory storage lock poisoned"))?
            .insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, FileStorageError> {
        Ok(self
            .files
            .read()
            .map_err(|_| FileStorageError::io("memory storage lock poisoned"))?
            .get(&key.to_string())
            .cloned())
    }
}
