//! Port for uploaded file bytes.

use async_trait::async_trait;

use crate::domain::StorageKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by storage adapters.
    pub enum FileStorageError {
        /// Backing store is not reachable or not writable.
        Unavailable { message: String } => "file storage unavailable: {message}",
        /// Read or write failed.
        Io { message: String } => "file storage I/O failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn put(&self, key: &StorageKey, bytes: Vec<u8>) -> Result<(), FileStorageError>;

    /// File contents, or `None` when the key is unknown.
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, FileStorageError>;
}
