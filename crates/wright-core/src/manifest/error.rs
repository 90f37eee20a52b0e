use thiserror::Error;

use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest '{path}' is unreadable: {source}")]
    ManifestUnreadable {
        path: String,
        #[source]
        source: StorageSystemError,
    },

    #[error("Failed to read manifest stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest as {format}: {source}")]
    Parse {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Invalid manifest entry '{entry}': {reason}")]
    InvalidEntry { entry: String, reason: String },
}
