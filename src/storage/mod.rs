//! Destination sinks for processed images.
//!
//! A sink takes an identifier (the uploaded file name in practice) and the
//! encoded bytes, and returns where they ended up. The filesystem sink never
//! leaves a partially written file behind: bytes go to a uniquely named
//! temporary file in the same directory, which is renamed over the target
//! only once fully written.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid destination '{0}'")]
    InvalidDestination(String),
}

/// Accepts `(identifier, bytes)` and stores them.
pub trait DestinationSink: Send + Sync {
    /// Store `data` under `destination`, returning the stored location
    fn write(&self, destination: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Remove a stored destination; missing destinations are not an error
    fn remove(&self, destination: &str) -> Result<(), StorageError>;

    fn exists(&self, destination: &str) -> bool;
}

/// Reduce an identifier to a bare file name.
///
/// Directory components are dropped so an upload can never escape the sink's
/// root. Empty names and `.`/`..` are rejected.
pub fn sanitize_file_name(destination: &str) -> Result<String, StorageError> {
    let name = destination
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(StorageError::InvalidDestination(destination.to_string()));
    }

    Ok(name.to_string())
}

/// Writes files under a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    root: PathBuf,
}

impl FilesystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Absolute-or-relative path a destination maps to
    pub fn path_for(&self, destination: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(sanitize_file_name(destination)?))
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = std::fs::File::create(temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    }
}

impl DestinationSink for FilesystemSink {
    fn write(&self, destination: &str, data: &[u8]) -> Result<String, StorageError> {
        let target = self.path_for(destination)?;
        let temp_path = self.root.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

        let result = self
            .write_temp(&temp_path, data)
            .and_then(|_| std::fs::rename(&temp_path, &target));

        if let Err(e) = result {
            if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %temp_path.display(),
                        error = %cleanup,
                        "Failed to remove temporary upload file"
                    );
                }
            }
            return Err(e.into());
        }

        Ok(target.to_string_lossy().into_owned())
    }

    fn remove(&self, destination: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(destination)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, destination: &str) -> bool {
        self.path_for(destination)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

/// Keeps stored images in memory, keyed by sanitized file name.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, destination: &str) -> Option<Vec<u8>> {
        let name = sanitize_file_name(destination).ok()?;
        self.entries.read().get(&name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl DestinationSink for MemorySink {
    fn write(&self, destination: &str, data: &[u8]) -> Result<String, StorageError> {
        let name = sanitize_file_name(destination)?;
        self.entries.write().insert(name.clone(), data.to_vec());
        Ok(name)
    }

    fn remove(&self, destination: &str) -> Result<(), StorageError> {
        let name = sanitize_file_name(destination)?;
        self.entries.write().remove(&name);
        Ok(())
    }

    fn exists(&self, destination: &str) -> bool {
        self.get(destination).is_some()
    }
}
