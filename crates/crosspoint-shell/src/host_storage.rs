//! Host-filesystem storage: maps the device's virtual paths under a
//! directory on the host machine.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::{Storage, StorageError};

/// `std::fs`-backed storage. A virtual path like `/sd/books/x.epub`
/// becomes `<root>/sd/books/x.epub` on the host.
pub struct HostStorage {
    root: PathBuf,
}

impl HostStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn host_path(&self, virtual_path: &str) -> PathBuf {
        self.root.join(virtual_path.trim_start_matches('/'))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for HostStorage {
    fn make_dir(&mut self, path: &str) -> Result<(), StorageError> {
        // create_dir_all is idempotent: existing directories succeed.
        fs::create_dir_all(self.host_path(path)).map_err(|err| StorageError::Io(err.to_string()))
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::write(self.host_path(path), bytes).map_err(|err| StorageError::Io(err.to_string()))
    }
}
