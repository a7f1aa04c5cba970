//! Book ingestion into the device's storage namespace.
//!
//! Host-selected files land at `/sd/books/<name>`, overwriting any
//! previous upload of the same name. Directory creation is idempotent;
//! the device core picks the file up from its virtual SD card.

extern crate alloc;

use alloc::format;
use alloc::string::String;

/// Virtual root of the device's removable storage.
pub const STORAGE_ROOT: &str = "/sd";
/// Directory the library scans for books.
pub const BOOKS_DIR: &str = "/sd/books";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    InvalidName,
    Io(String),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::InvalidName => write!(f, "Invalid file name"),
            StorageError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// Write access to the device's virtual storage.
///
/// Implementations: Emscripten MEMFS (web), `HostStorage` (desktop),
/// `MockStorage` (tests).
pub trait Storage {
    /// Create a directory. Succeeds if it already exists.
    fn make_dir(&mut self, path: &str) -> Result<(), StorageError>;

    /// Write `bytes` to `path`, replacing any existing file.
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Store an uploaded book under [`BOOKS_DIR`] and return the full path.
/// Ensures the storage root and book directory exist first.
pub fn store_book<S: Storage>(
    storage: &mut S,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, StorageError> {
    let name = sanitize_filename(file_name).ok_or(StorageError::InvalidName)?;

    storage.make_dir(STORAGE_ROOT)?;
    storage.make_dir(BOOKS_DIR)?;

    let path = format!("{}/{}", BOOKS_DIR, name);
    storage.write_file(&path, bytes)?;
    Ok(path)
}

/// Accept a plain file name; reject separators and dot traversal.
pub fn sanitize_filename(input: &str) -> Option<&str> {
    let name = input.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    if name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct MapStorage {
        dirs: Vec<String>,
        files: BTreeMap<String, Vec<u8>>,
    }

    impl Storage for MapStorage {
        fn make_dir(&mut self, path: &str) -> Result<(), StorageError> {
            if !self.dirs.iter().any(|d| d == path) {
                self.dirs.push(path.to_string());
            }
            Ok(())
        }

        fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
            self.files.insert(path.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn stores_under_books_dir() {
        let mut storage = MapStorage::default();
        let path = store_book(&mut storage, "book.epub", &[1, 2, 3]).unwrap();
        assert_eq!(path, "/sd/books/book.epub");
        assert_eq!(storage.dirs, vec!["/sd", "/sd/books"]);
        assert_eq!(storage.files["/sd/books/book.epub"], vec![1, 2, 3]);
    }

    #[test]
    fn repeat_store_overwrites() {
        let mut storage = MapStorage::default();
        store_book(&mut storage, "book.epub", &[1]).unwrap();
        store_book(&mut storage, "book.epub", &[2, 3]).unwrap();
        assert_eq!(storage.files["/sd/books/book.epub"], vec![2, 3]);
        // make_dir stayed idempotent.
        assert_eq!(storage.dirs.len(), 2);
    }

    #[test]
    fn traversal_names_rejected() {
        let mut storage = MapStorage::default();
        assert_eq!(
            store_book(&mut storage, "../escape.epub", &[]),
            Err(StorageError::InvalidName)
        );
        assert_eq!(
            store_book(&mut storage, "a/b.epub", &[]),
            Err(StorageError::InvalidName)
        );
        assert_eq!(
            store_book(&mut storage, "..", &[]),
            Err(StorageError::InvalidName)
        );
        assert!(storage.files.is_empty());
    }

    #[test]
    fn sanitize_trims_whitespace() {
        assert_eq!(sanitize_filename("  book.epub  "), Some("book.epub"));
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("   "), None);
    }
}
