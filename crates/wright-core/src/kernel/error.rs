//! # Wright Core Kernel Errors
//!
//! Defines the top-level error type of the assembly engine.
//!
//! [`Error`] aggregates the typed errors of every subsystem (factory,
//! manifest, stage manager, storage, plugin system, services) and adds
//! [`Error::KernelLifecycleError`], the single fatal error that
//! [`AppServer::init`](crate::kernel::bootstrap::AppServer::init) surfaces
//! when a startup phase aborts.
use std::error::Error as StdError;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::factory::error::AssemblyError;
use crate::manifest::error::ManifestError;
use crate::plugin_system::error::PluginSystemError;
use crate::service::error::ServiceError;
use crate::stage_manager::error::StageSystemError;
use crate::storage::error::StorageSystemError;

/// Top-level error of the wright kernel.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Component construction or dependency resolution failed
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// The manifest could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Specific, typed stage system error
    #[error("Stage system error: {0}")]
    StageSystem(#[from] StageSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Service registry error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        stage_id: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("RunPreCheck")]
    RunPreCheck,
    #[error("Initialize")]
    Initialize,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Walks the source chain (starting with `self`) and returns the first
    /// error of type `E`.
    ///
    /// Startup failures arrive wrapped in a lifecycle error and a stage
    /// execution error; this recovers the typed cause underneath.
    pub fn find_cause<E: StdError + 'static>(&self) -> Option<&E> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }

    /// The stage that aborted startup, if this is a lifecycle error raised by `init`.
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Error::KernelLifecycleError { stage_id, .. } => stage_id.as_deref(),
            _ => None,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
