//! # Wright Core Stage Manager Errors
//!
//! Defines [`StageSystemError`], the failures of registering stages, building
//! pipelines, executing them, and passing data between stages.
use thiserror::Error;

use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum StageSystemError {
    #[error("Stage '{stage_id}' not found")]
    StageNotFound { stage_id: String },

    #[error("Stage '{stage_id}' already exists in the registry")]
    StageAlreadyExists { stage_id: String },

    #[error("Pipeline '{pipeline_name}' validation: Stage '{stage_id}' not found in registry")]
    StageNotFoundInPipelineValidation { pipeline_name: String, stage_id: String },

    #[error("Stage execution failed for stage '{stage_id}': {source}")]
    StageExecutionFailed {
        stage_id: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Error accessing data from StageContext: Key '{key}' - {reason}")]
    ContextError { key: String, reason: String },
}
