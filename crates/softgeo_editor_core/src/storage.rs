// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text storage backends for graph documents.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage failure, always tagged with the path involved
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },
    /// Nothing stored under this path
    #[error("nothing stored at {0}")]
    NotFound(PathBuf),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// The path the failure concerns
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) => path,
        }
    }
}

/// Somewhere graph text can be read from and written to
pub trait Storage {
    /// Read the full text stored at `path`
    fn read_text(&self, path: &Path) -> Result<String, StorageError>;

    /// Replace whatever is stored at `path` with `text`
    fn write_text(&mut self, path: &Path, text: &str) -> Result<(), StorageError>;
}

/// Local filesystem storage.
///
/// Writes go to a temporary file next to the target which is then renamed
/// over it, so a failed save never leaves a truncated document behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn read_text(&self, path: &Path) -> Result<String, StorageError> {
        std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))
    }

    fn write_text(&mut self, path: &Path, text: &str) -> Result<(), StorageError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StorageError::io(path, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| StorageError::io(path, e))?;
        tmp.persist(path).map_err(|e| StorageError::io(path, e.error))?;
        Ok(())
    }
}

/// In-memory storage, mostly for tests and scratch documents
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: HashMap<PathBuf, String>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored text for `path`, if any
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read_text(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    fn write_text(&mut self, path: &Path, text: &str) -> Result<(), StorageError> {
        self.files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let mut storage = FileStorage;

        storage.write_text(&path, "first").unwrap();
        storage.write_text(&path, "second").unwrap();
        assert_eq!(storage.read_text(&path).unwrap(), "second");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_storage_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = FileStorage.read_text(&path).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn test_file_storage_bad_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("graph.json");
        assert!(FileStorage.write_text(&path, "x").is_err());
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert!(storage.read_text(Path::new("a")).is_err());
        storage.write_text(Path::new("a"), "text").unwrap();
        assert_eq!(storage.get("a"), Some("text"));
        assert_eq!(storage.len(), 1);
    }
}
