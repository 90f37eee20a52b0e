use std::fmt::Debug;
use std::io::Read;
use std::path::Path;

use crate::storage::error::StorageSystemError;

/// Read access to the resources of an application root.
pub trait StorageProvider: Send + Sync + Debug {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read a file to a string
    fn read_to_string(&self, path: &Path) -> Result<String, StorageSystemError>;

    /// Read a file to a vector of bytes
    fn read_to_bytes(&self, path: &Path) -> Result<Vec<u8>, StorageSystemError>;

    /// Open a file for reading
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, StorageSystemError>;
}
