use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;

/// Local filesystem storage provider rooted at `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    base_path: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider with the given base path
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a resource path against the base path.
    ///
    /// Resource paths are root-relative: a leading `/` is dropped, and a path
    /// that climbs out of the base with `..` is rejected.
    pub fn resolve_path(&self, path: &Path) -> Result<PathBuf, StorageSystemError> {
        let mut resolved = self.base_path.clone();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(StorageSystemError::InvalidPath {
                        path: path.to_path_buf(),
                        reason: "path leaves the application root".to_string(),
                    });
                }
            }
        }
        Ok(resolved)
    }
}

impl StorageProvider for LocalStorageProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve_path(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, StorageSystemError> {
        let full_path = self.resolve_path(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageSystemError::io(e, "read_to_string", full_path))
    }

    fn read_to_bytes(&self, path: &Path) -> Result<Vec<u8>, StorageSystemError> {
        let full_path = self.resolve_path(path)?;
        fs::read(&full_path).map_err(|e| StorageSystemError::io(e, "read_to_bytes", full_path))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, StorageSystemError> {
        let full_path = self.resolve_path(path)?;
        let file = File::open(&full_path)
            .map_err(|e| StorageSystemError::io(e, "open_read", full_path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
