//! Directory-backed [`FileStorage`] using a `cap-std` capability.
//!
//! Files live at `{root}/{scope}/{name}`. The root is opened once as a
//! [`Dir`], so no key can address anything outside it. Writes go to a hidden
//! temporary file that is then renamed into place, so readers never observe
//! a partial upload.

use std::io::{self, ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::StorageKey;
use crate::domain::ports::{FileStorage, FileStorageError};

/// Stores uploads below a root directory on the local file system.
#[derive(Clone)]
pub struct LocalFileStorage {
    root: Arc<Dir>,
}

impl LocalFileStorage {
    /// Open (creating when missing) the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`FileStorageError::Unavailable`] when the directory cannot be
    /// created or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileStorageError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(path, ambient_authority()))
            .map(|dir| Self {
                root: Arc::new(dir),
            })
            .map_err(|err| {
                FileStorageError::unavailable(format!("{}: {err}", path.display()))
            })
    }

    fn write_blocking(root: &Dir, key: &StorageKey, bytes: &[u8]) -> io::Result<()> {
        let scope = key.scope().as_str();
        root.create_dir_all(scope)?;
        let scope_dir = root.open_dir(scope)?;
        let tmp_name = format!(".{}.tmp", key.name());
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        {
            let mut file = scope_dir.open_with(&tmp_name, &options)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        scope_dir.rename(&tmp_name, &scope_dir, key.name())
    }

    fn read_blocking(root: &Dir, key: &StorageKey) -> io::Result<Option<Vec<u8>>> {
        let path = format!("{}/{}", key.scope().as_str(), key.name());
        match root.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn map_io_error(err: io::Error) -> FileStorageError {
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::StorageFull | ErrorKind::ReadOnlyFilesystem => {
            FileStorageError::unavailable(err.to_string())
        }
        _ => FileStorageError::io(err.to_string()),
    }
}

fn map_join_error(err: tokio::task::JoinError) -> FileStorageError {
    FileStorageError::io(format!("storage task failed: {err}"))
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(&self, key: &StorageKey, bytes: Vec<u8>) -> Result<(), FileStorageError> {
        let root = Arc::clone(&self.root);
        let key = key.clone();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || Self::write_blocking(&root, &key, &bytes))
            .await
            .map_err(map_join_error)?
            .map_err(map_io_error)?;
        debug!(size, "upload written to local storage");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, FileStorageError> {
        let root = Arc::clone(&self.root);
        let key = key.clone();
        tokio::task::spawn_blocking(move || Self::read_blocking(&root, &key))
            .await
            .map_err(map_join_error)?
            .map_err(map_io_error)
    }
}
