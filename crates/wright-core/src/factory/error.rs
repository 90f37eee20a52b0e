//! # Wright Core Assembly Errors
//!
//! Defines [`AssemblyError`], the failure taxonomy of component construction:
//! unknown types, constructor selection and invocation failures, missing
//! dependency variables, and the setup failures of the collaborators the
//! startup phases wire together.
use thiserror::Error;

/// Boxed error returned by constructors and collaborator hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Type '{type_id}' is not registered")]
    TypeResolutionFailure { type_id: String },

    #[error("Type '{type_id}' is already registered")]
    TypeAlreadyRegistered { type_id: String },

    #[error("No suitable constructor for type '{type_id}': {reason}")]
    ConstructorSelectionFailure { type_id: String, reason: String },

    #[error("Constructor of type '{type_id}' failed: {source}")]
    ConstructorInvocationFailure {
        type_id: String,
        #[source]
        source: BoxError,
    },

    #[error("No object bound for variable: {key}")]
    MissingDependencyVariable { key: String },

    #[error("Value for '{type_id}' is not a {expected}")]
    TypeMismatch {
        type_id: String,
        expected: &'static str,
    },

    #[error("Invalid literal for argument type '{type_id}': {value} ({reason})")]
    InvalidLiteral {
        type_id: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for property '{key}': {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to initialize lifecycle listeners: {source}")]
    LifecycleListenerInitFailure {
        #[source]
        source: BoxError,
    },

    #[error("Setup of component '{type_id}' failed: {source}")]
    ComponentSetupFailure {
        type_id: String,
        #[source]
        source: BoxError,
    },
}

impl AssemblyError {
    /// The type identifier or variable key the error is about.
    pub fn subject(&self) -> Option<&str> {
        match self {
            AssemblyError::TypeResolutionFailure { type_id }
            | AssemblyError::TypeAlreadyRegistered { type_id }
            | AssemblyError::ConstructorSelectionFailure { type_id, .. }
            | AssemblyError::ConstructorInvocationFailure { type_id, .. }
            | AssemblyError::TypeMismatch { type_id, .. }
            | AssemblyError::InvalidLiteral { type_id, .. }
            | AssemblyError::ComponentSetupFailure { type_id, .. } => Some(type_id),
            AssemblyError::MissingDependencyVariable { key }
            | AssemblyError::InvalidProperty { key, .. } => Some(key),
            AssemblyError::LifecycleListenerInitFailure { .. } => None,
        }
    }
}
