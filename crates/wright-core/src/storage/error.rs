//! # Wright Core Storage Errors
//!
//! Defines [`StorageSystemError`], the failures of reading application
//! resources through a [`StorageProvider`](crate::storage::StorageProvider).
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found at path: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid path provided: '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: String },
}

// Helper for creating Io errors, ensuring path is always included.
impl StorageSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return StorageSystemError::FileNotFound(path);
        }
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
