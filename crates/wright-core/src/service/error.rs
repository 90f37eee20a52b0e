use thiserror::Error;

use crate::factory::error::BoxError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Services have already been started")]
    AlreadyStarted,

    #[error("Service '{name}' failed to start: {source}")]
    StartFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Service '{name}' failed to stop: {source}")]
    StopFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Unknown transaction: tx-{0}")]
    UnknownTransaction(u64),
}
