pub mod context;
pub mod core_stages;
pub mod error;
pub mod pipeline;
pub mod registry;

use crate::kernel::error::Result;
use std::fmt;
use async_trait::async_trait;

/// Core trait that all stages must implement
#[async_trait]
pub trait Stage: Send + Sync {
    /// The unique identifier of the stage
    fn id(&self) -> &str;

    /// The human-readable name of the stage
    fn name(&self) -> &str;

    /// The description of what this stage does
    fn description(&self) -> &str;

    /// Whether this stage supports dry run mode
    fn supports_dry_run(&self) -> bool {
        true
    }

    /// Execute the stage with the given context
    async fn execute(&self, context: &mut context::StageContext) -> Result<()>;

    /// Generate a description of what this stage would do in dry run mode
    fn dry_run_description(&self, _context: &context::StageContext) -> String {
        format!("Would execute stage: {}", self.name())
    }
}

/// Result of a stage execution
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageResult {
    /// Stage executed successfully
    Success,
    /// Stage was not executed; carries the dry-run description
    Planned(String),
    /// Stage was skipped
    Skipped(String),
}

impl fmt::Display for StageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageResult::Success => write!(f, "Success"),
            StageResult::Planned(description) => write!(f, "Planned: {}", description),
            StageResult::Skipped(reason) => write!(f, "Skipped: {}", reason),
        }
    }
}

// Re-export important types
pub use context::{ExecutionMode, StageContext};
pub use error::StageSystemError;
pub use pipeline::{PipelineDefinition, StagePipeline};
pub use registry::{SharedStageRegistry, StageRegistry};

// Test module declaration
#[cfg(test)]
mod tests;
